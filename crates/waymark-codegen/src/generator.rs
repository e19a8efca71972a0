//! 路由表生成器：把扫描结果折叠成唯一的 `url → 身份` 映射，并渲染为 Rust 源码模板。
//!
//! # 教案级说明
//! - **意图 (Why)**：运行期只认 `route_mapping()` 这一个入口，生成器负责在构建期把
//!   所有声明合并成一张确定性的表，重复与空 URL 的取舍也在这里一次性决定；
//! - **契约 (What)**：
//!   - 输入按扫描顺序到达，规范键（忽略查询串与 fragment）相同的后到者覆盖先到者；
//!   - 渲染结果只取决于表内容：条目按 URL 排序，不含时间戳，重复构建得到逐字节相同的源码；
//!   - 渲染过程不加载、不执行任何被发现的组件；
//! - **流程 (How)**：
//!   1. [`RouteTableBuilder::push`] 逐条应用 [`DuplicatePolicy`] 与 [`EmptyUrlPolicy`]；
//!   2. [`RouteTableBuilder::finish`] 产出 [`GeneratedTable`]；
//!   3. [`render_module`] 拼接模板，[`render_manifest_json`] 输出同源 JSON 清单。

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write;

use waymark_core::{DestinationMetadata, RouteRequest};

use crate::config::{DuplicatePolicy, EmptyUrlPolicy};
use crate::error::CodegenError;

/// 逐条接收声明并应用生成策略。
///
/// 重复判定使用运行期查表的规范键（`scheme://namespace/path`），因此只在查询串或
/// fragment 上不同的 URL 同样视为重复；无法解析的 URL 以原文作键。
#[derive(Debug)]
pub struct RouteTableBuilder {
    duplicate_policy: DuplicatePolicy,
    empty_url: EmptyUrlPolicy,
    entries: BTreeMap<String, DestinationMetadata>,
    /// 规范键 → 当前占用该键的登记 URL。
    keys: HashMap<String, String>,
    replaced: usize,
}

impl RouteTableBuilder {
    pub fn new(duplicate_policy: DuplicatePolicy, empty_url: EmptyUrlPolicy) -> Self {
        Self {
            duplicate_policy,
            empty_url,
            entries: BTreeMap::new(),
            keys: HashMap::new(),
            replaced: 0,
        }
    }

    /// 写入一条声明。
    ///
    /// # 契约说明
    /// - 规范键已被占用时：`Silent` 直接覆盖，`Warn` 覆盖并记 `warn`，`Fail` 返回
    ///   [`CodegenError::DuplicateUrl`] 且表保持不变；覆盖会移除先前的登记 URL，
    ///   同一规范键在表中只出现一次；
    /// - URL 为空且策略为 `Reject` 时返回 [`CodegenError::EmptyUrl`]。
    pub fn push(&mut self, destination: DestinationMetadata) -> Result<(), CodegenError> {
        if destination.url().is_empty() && self.empty_url == EmptyUrlPolicy::Reject {
            return Err(CodegenError::EmptyUrl {
                identity: destination.qualified_identity().to_owned(),
            });
        }

        let key = lookup_key(destination.url());
        let previous = self.keys.get(&key).and_then(|url| self.entries.get(url));
        if let Some(previous) = previous {
            match self.duplicate_policy {
                DuplicatePolicy::Fail => {
                    return Err(CodegenError::DuplicateUrl {
                        url: destination.url().to_owned(),
                        first: previous.qualified_identity().to_owned(),
                        second: destination.qualified_identity().to_owned(),
                    });
                }
                DuplicatePolicy::Warn => {
                    tracing::warn!(
                        target: "waymark::generator",
                        %key,
                        replaced_url = %previous.url(),
                        replaced = %previous.qualified_identity(),
                        url = %destination.url(),
                        winner = %destination.qualified_identity(),
                        "duplicate url, the later declaration wins"
                    );
                }
                DuplicatePolicy::Silent => {}
            }
            self.replaced += 1;
        }

        if let Some(shadowed) = self.keys.insert(key, destination.url().to_owned()) {
            self.entries.remove(&shadowed);
        }
        self.entries.insert(destination.url().to_owned(), destination);
        Ok(())
    }

    /// 依次写入全部声明，遇到首个错误即停止。
    pub fn extend<I>(&mut self, destinations: I) -> Result<(), CodegenError>
    where
        I: IntoIterator<Item = DestinationMetadata>,
    {
        destinations.into_iter().try_for_each(|d| self.push(d))
    }

    pub fn finish(self) -> GeneratedTable {
        tracing::info!(
            target: "waymark::generator",
            routes = self.entries.len(),
            replaced = self.replaced,
            "route table assembled"
        );
        GeneratedTable {
            entries: self.entries,
        }
    }
}

/// 与运行期查表一致的规范键；无法解析的 URL 原样返回。
fn lookup_key(url: &str) -> String {
    RouteRequest::parse(url)
        .map(|request| request.lookup_key())
        .unwrap_or_else(|_| url.to_owned())
}

/// 折叠完成的路由表，URL 唯一且有序。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeneratedTable {
    entries: BTreeMap<String, DestinationMetadata>,
}

impl GeneratedTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按 URL 读取身份。
    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(DestinationMetadata::qualified_identity)
    }

    /// 按 URL 顺序遍历保留下来的声明。
    pub fn destinations(&self) -> impl Iterator<Item = &DestinationMetadata> {
        self.entries.values()
    }

    /// 去重且有序的身份集合。
    pub fn identities(&self) -> BTreeSet<&str> {
        self.destinations()
            .map(DestinationMetadata::qualified_identity)
            .collect()
    }
}

/// 渲染可被 `include!` 的 Rust 源码。
///
/// 产物暴露 `route_mapping()`；`emit_factories` 为真时额外暴露 `register_factories()`，
/// 其中身份前缀 `crate_name::` 被改写为 `crate::`，要求产物在同一 crate 内被包含。
pub fn render_module(table: &GeneratedTable, emit_factories: bool, crate_name: &str) -> String {
    let mut buffer = String::new();
    buffer.push_str("// @generated 自动生成文件，请勿手工修改。\n");
    buffer.push_str("// 由 waymark-codegen 根据 #[destination] 标注生成。\n\n");

    buffer.push_str("/// 生成的 `url → qualified identity` 映射，每次调用返回一份新的副本。\n");
    buffer.push_str(concat!(
        "pub fn route_mapping() -> ",
        "::std::collections::HashMap<::std::string::String, ::std::string::String> {\n",
    ));
    writeln!(
        buffer,
        "    let mut mapping = ::std::collections::HashMap::with_capacity({});",
        table.len()
    )
    .expect("写入 String 不会失败");
    for destination in table.destinations() {
        if !destination.description().is_empty() {
            writeln!(buffer, "    // {}", single_line(destination.description()))
                .expect("写入 String 不会失败");
        }
        writeln!(
            buffer,
            "    mapping.insert({:?}.to_owned(), {:?}.to_owned());",
            destination.url(),
            destination.qualified_identity()
        )
        .expect("写入 String 不会失败");
    }
    buffer.push_str("    mapping\n}\n");

    if emit_factories {
        buffer.push_str("\n/// 把每个已登记身份的默认构造器写入注册表。\n");
        buffer.push_str(
            "pub fn register_factories(registry: &mut ::waymark_core::ComponentRegistry) {\n",
        );
        if table.is_empty() {
            buffer.push_str("    let _ = registry;\n");
        }
        let prefix = format!("{}::", crate_name.replace('-', "_"));
        for identity in table.identities() {
            let path = match identity.strip_prefix(&prefix) {
                Some(rest) => format!("crate::{rest}"),
                None => format!("::{identity}"),
            };
            writeln!(buffer, "    registry.register_destination::<{path}>();")
                .expect("写入 String 不会失败");
        }
        buffer.push_str("}\n");
    }

    buffer
}

/// 渲染 JSON 清单：`[{url, description, qualified_identity}]`，按 URL 排序。
pub fn render_manifest_json(table: &GeneratedTable) -> Result<String, serde_json::Error> {
    let destinations: Vec<&DestinationMetadata> = table.destinations().collect();
    let mut json = serde_json::to_string_pretty(&destinations)?;
    json.push('\n');
    Ok(json)
}

/// 描述文本写进行注释前去掉换行。
fn single_line(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}
