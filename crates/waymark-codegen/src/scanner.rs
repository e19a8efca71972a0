//! 元数据扫描器：沿模块树遍历编译单元，收集所有带标注的类型声明。
//!
//! # 教案级说明
//! - **意图 (Why)**：标注本身只在编译期存在，扫描器在构建脚本中按编译器的视角重走一遍
//!   模块树，把 `(url, description, qualified_identity)` 三元组交给生成器；
//! - **契约 (What)**：
//!   - 输入：crate 根文件（`src/lib.rs` 或 `src/main.rs`）与 crate 名；
//!   - 输出：按遍历顺序排列的 [`DestinationMetadata`]、访问过的文件列表与诊断信息；
//!   - 全限定名规则与 `module_path!()` 相同：`crate_name::mod_a::mod_b::TypeName`，
//!     crate 名中的 `-` 替换为 `_`；
//!   - 只读：不修改任何源文件。
//! - **流程 (How)**：
//!   1. `mod x;` 依次尝试 `#[path]` 指定文件、`x.rs`、`x/mod.rs`；
//!   2. 内联 `mod x { .. }` 直接下钻；
//!   3. 带 `#[cfg(test)]` 的模块整体跳过；
//!   4. 标注出现在非类型条目上时记一条诊断并跳过（过程宏会在编译期直接报错）。
//! - **风险 (Trade-offs)**：
//!   - 宏生成的模块与条目对扫描器不可见；函数体内声明的类型不会被收集；
//!   - 除 `#[cfg(test)]` 外不求值任何 `cfg`：特性门控（`#[cfg(feature = "..")]`）或平台门控的
//!     模块即使本次编译未启用也会被收集。路由表因此可能登记编译产物中不存在的身份；
//!     开启 `emit-factories` 时，生成的 `register_factories()` 会引用这些类型而编译失败，
//!     此类声明应放在无条件编译的模块中。

use std::fs;
use std::path::{Path, PathBuf};

use syn::spanned::Spanned;
use syn::{Attribute, Item, ItemMod, Meta};
use waymark_core::DestinationMetadata;

use crate::error::CodegenError;
use crate::marker::{MarkerArgs, is_marker};

/// 扫描过程中发现、但不足以中止构建的问题。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanDiagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub message: String,
}

impl ScanDiagnostic {
    /// 格式化为 `path:line message`，便于在构建日志中跳转。
    pub fn format(&self) -> String {
        format!("{}:{} {}", self.file.display(), self.line, self.message)
    }
}

/// 一次扫描的完整结果。
#[derive(Clone, Debug, Default)]
pub struct ScanReport {
    pub destinations: Vec<DestinationMetadata>,
    pub visited_files: Vec<PathBuf>,
    pub diagnostics: Vec<ScanDiagnostic>,
}

/// 模块树扫描器。
#[derive(Clone, Debug)]
pub struct Scanner {
    crate_name: String,
    marker: String,
}

impl Scanner {
    pub fn new(crate_name: &str, marker: impl Into<String>) -> Self {
        Self {
            crate_name: crate_name.replace('-', "_"),
            marker: marker.into(),
        }
    }

    /// 从 crate 根文件开始扫描。
    pub fn scan(&self, root_file: &Path) -> Result<ScanReport, CodegenError> {
        let mut report = ScanReport::default();
        let root_dir = root_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let module_path = vec![self.crate_name.clone()];
        self.scan_file(root_file, &root_dir, &module_path, &mut report)?;

        tracing::info!(
            target: "waymark::scanner",
            crate_name = %self.crate_name,
            destinations = report.destinations.len(),
            files = report.visited_files.len(),
            "scan finished"
        );
        Ok(report)
    }

    /// 扫描单个文件。`child_dir` 是该文件内 `mod x;` 的查找目录。
    fn scan_file(
        &self,
        file: &Path,
        child_dir: &Path,
        module_path: &[String],
        report: &mut ScanReport,
    ) -> Result<(), CodegenError> {
        let source = fs::read_to_string(file).map_err(|err| CodegenError::io(file, err))?;
        let parsed = syn::parse_file(&source).map_err(|source| CodegenError::Parse {
            path: file.to_path_buf(),
            source,
        })?;
        report.visited_files.push(file.to_path_buf());
        tracing::debug!(
            target: "waymark::scanner",
            file = %file.display(),
            module = %module_path.join("::"),
            "scanning"
        );

        let location = Location {
            file,
            child_dir: child_dir.to_path_buf(),
            module_path: module_path.to_vec(),
            inline: false,
        };
        self.scan_items(&parsed.items, &location, report)
    }

    fn scan_items(
        &self,
        items: &[Item],
        location: &Location<'_>,
        report: &mut ScanReport,
    ) -> Result<(), CodegenError> {
        for item in items {
            match item {
                Item::Struct(item) => self.collect(&item.attrs, &item.ident, location, report),
                Item::Enum(item) => self.collect(&item.attrs, &item.ident, location, report),
                Item::Union(item) => self.collect(&item.attrs, &item.ident, location, report),
                Item::Mod(item) => self.scan_module(item, location, report)?,
                other => {
                    let misplaced = item_attrs(other)
                        .and_then(|attrs| attrs.iter().find(|attr| is_marker(attr, &self.marker)));
                    if let Some(attr) = misplaced {
                        self.diagnose(
                            report,
                            location.file,
                            attr,
                            "marker is only valid on struct, enum or union declarations; skipped",
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn scan_module(
        &self,
        item: &ItemMod,
        location: &Location<'_>,
        report: &mut ScanReport,
    ) -> Result<(), CodegenError> {
        if is_cfg_test(&item.attrs) {
            return Ok(());
        }
        let name = item.ident.to_string();
        let mut module_path = location.module_path.clone();
        module_path.push(name.clone());

        if let Some((_, items)) = &item.content {
            let nested = Location {
                file: location.file,
                child_dir: location.child_dir.join(&name),
                module_path,
                inline: true,
            };
            return self.scan_items(items, &nested, report);
        }

        let explicit = path_attribute(&item.attrs);
        let candidates = match &explicit {
            // 非内联位置的 `#[path]` 相对声明文件所在目录解析。
            Some(relative) if !location.inline => {
                let base = location.file.parent().unwrap_or(Path::new(""));
                vec![base.join(relative)]
            }
            Some(relative) => vec![location.child_dir.join(relative)],
            None => vec![
                location.child_dir.join(format!("{name}.rs")),
                location.child_dir.join(&name).join("mod.rs"),
            ],
        };
        let Some(found) = candidates.iter().find(|candidate| candidate.is_file()).cloned() else {
            return Err(CodegenError::ModuleNotFound {
                module: module_path.join("::"),
                declared_in: location.file.to_path_buf(),
                candidates,
            });
        };

        // `mod.rs` 与 `#[path]` 载入的文件按 mod-rs 规则处理：子模块位于自身所在目录；
        // 其余 `x.rs` 的子模块位于 `x/`。
        let mod_rs = explicit.is_some() || found.file_name().is_some_and(|n| n == "mod.rs");
        let nested_dir = if mod_rs {
            found.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            location.child_dir.join(&name)
        };
        self.scan_file(&found, &nested_dir, &module_path, report)
    }

    fn collect(
        &self,
        attrs: &[Attribute],
        ident: &syn::Ident,
        location: &Location<'_>,
        report: &mut ScanReport,
    ) {
        let file = location.file;
        let mut markers = attrs.iter().filter(|attr| is_marker(attr, &self.marker));
        let Some(attr) = markers.next() else {
            return;
        };
        if let Some(extra) = markers.next() {
            self.diagnose(
                report,
                file,
                extra,
                "a type may declare only one destination; extra markers skipped",
            );
        }

        let args = match MarkerArgs::from_attribute(attr) {
            Ok(args) => args,
            Err(err) => {
                self.diagnose(report, file, attr, &format!("unreadable marker skipped: {err}"));
                return;
            }
        };

        let identity = format!("{}::{}", location.module_path.join("::"), ident);
        tracing::debug!(
            target: "waymark::scanner",
            url = %args.url,
            description = %args.description,
            %identity,
            "destination found"
        );
        report
            .destinations
            .push(DestinationMetadata::new(args.url, args.description, identity));
    }

    fn diagnose(&self, report: &mut ScanReport, file: &Path, attr: &Attribute, message: &str) {
        let diagnostic = ScanDiagnostic {
            file: file.to_path_buf(),
            line: attr.span().start().line,
            message: message.to_owned(),
        };
        tracing::warn!(target: "waymark::scanner", "{}", diagnostic.format());
        report.diagnostics.push(diagnostic);
    }
}

/// 当前遍历位置。
struct Location<'a> {
    /// 条目所在的物理文件。
    file: &'a Path,
    /// `mod x;` 的查找目录。
    child_dir: PathBuf,
    module_path: Vec<String>,
    /// 是否位于内联 `mod x { .. }` 块中。
    inline: bool,
}

fn item_attrs(item: &Item) -> Option<&[Attribute]> {
    let attrs = match item {
        Item::Const(item) => &item.attrs,
        Item::Fn(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        Item::Static(item) => &item.attrs,
        Item::Trait(item) => &item.attrs,
        Item::TraitAlias(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Use(item) => &item.attrs,
        Item::ExternCrate(item) => &item.attrs,
        Item::ForeignMod(item) => &item.attrs,
        Item::Macro(item) => &item.attrs,
        _ => return None,
    };
    Some(attrs)
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

fn path_attribute(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(name_value) if name_value.path.is_ident("path") => match &name_value.value
        {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(literal),
                ..
            }) => Some(literal.value()),
            _ => None,
        },
        _ => None,
    })
}
