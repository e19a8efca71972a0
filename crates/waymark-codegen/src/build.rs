//! 构建脚本入口。
//!
//! # 教案级说明
//! - **意图 (Why)**：宿主 crate 的 `build.rs` 只需一行 `Builder::new().generate()`，
//!   扫描、折叠、渲染、写盘与 Cargo 指令全部在此串联；
//! - **契约 (What)**：
//!   - 未显式设置的路径从 Cargo 注入的环境变量推导：`CARGO_MANIFEST_DIR`、`CARGO_PKG_NAME`、
//!     `OUT_DIR`，缺失时返回 [`CodegenError::MissingEnv`]；
//!   - `Builder` 的显式设置覆盖 `waymark.toml` 中的同名项；
//!   - `generate` 消费 `Builder`，一次构建只生成一次；
//!   - 任何错误都应使构建脚本失败退出；
//! - **流程 (How)**：
//!   1. 装载配置并合并覆盖项；
//!   2. 从 crate 根文件扫描；
//!   3. 按策略折叠并渲染；
//!   4. 写盘，输出 `cargo:rerun-if-changed`、`cargo:warning` 与
//!      `cargo:rustc-env=WAYMARK_ROUTE_TABLE=<path>`。

use std::env;
use std::path::{Path, PathBuf};

use waymark_core::ROUTE_TABLE_ENV;

use crate::artifact::{self, WrittenArtifacts};
use crate::config::{CodegenConfig, DuplicatePolicy, EmptyUrlPolicy};
use crate::error::CodegenError;
use crate::generator::{self, GeneratedTable, RouteTableBuilder};
use crate::scanner::{ScanDiagnostic, Scanner};

/// 默认配置文件名，位于 crate 清单目录下。
pub const CONFIG_FILE: &str = "waymark.toml";

/// 生成一次的完整结果。
#[derive(Clone, Debug)]
pub struct GenerateOutput {
    pub table: GeneratedTable,
    pub artifacts: WrittenArtifacts,
    pub diagnostics: Vec<ScanDiagnostic>,
    /// 影响本次结果的全部输入文件：访问过的源码，以及实际存在的配置文件。
    pub tracked_files: Vec<PathBuf>,
}

/// 构建期生成器的配置入口。
#[derive(Clone, Debug)]
pub struct Builder {
    crate_name: Option<String>,
    manifest_dir: Option<PathBuf>,
    root_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    marker: Option<String>,
    duplicate_policy: Option<DuplicatePolicy>,
    empty_url: Option<EmptyUrlPolicy>,
    emit_factories: Option<bool>,
    manifest: Option<bool>,
    cargo_directives: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            crate_name: None,
            manifest_dir: None,
            root_file: None,
            config_file: None,
            out_dir: None,
            marker: None,
            duplicate_policy: None,
            empty_url: None,
            emit_factories: None,
            manifest: None,
            cargo_directives: true,
        }
    }

    /// 身份前缀使用的 crate 名，默认取 `CARGO_PKG_NAME`。
    pub fn crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = Some(name.into());
        self
    }

    /// crate 清单目录，默认取 `CARGO_MANIFEST_DIR`。
    pub fn manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifest_dir = Some(dir.into());
        self
    }

    /// 扫描起点，默认 `src/lib.rs`，不存在时退回 `src/main.rs`。
    pub fn root_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_file = Some(path.into());
        self
    }

    /// 配置文件路径，默认 `<manifest_dir>/waymark.toml`。
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// 产物目录，默认取 `OUT_DIR`。
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = Some(policy);
        self
    }

    pub fn empty_url(mut self, policy: EmptyUrlPolicy) -> Self {
        self.empty_url = Some(policy);
        self
    }

    pub fn emit_factories(mut self, enabled: bool) -> Self {
        self.emit_factories = Some(enabled);
        self
    }

    pub fn manifest(mut self, enabled: bool) -> Self {
        self.manifest = Some(enabled);
        self
    }

    /// 是否向 stdout 输出 `cargo:` 指令；构建脚本之外调用时可关闭。
    pub fn cargo_directives(mut self, enabled: bool) -> Self {
        self.cargo_directives = enabled;
        self
    }

    /// 执行扫描、生成与写盘。
    pub fn generate(self) -> Result<GenerateOutput, CodegenError> {
        let manifest_dir = match &self.manifest_dir {
            Some(dir) => dir.clone(),
            None => env_path("CARGO_MANIFEST_DIR")?,
        };
        let crate_name = match &self.crate_name {
            Some(name) => name.clone(),
            None => env::var("CARGO_PKG_NAME")
                .map_err(|_| CodegenError::MissingEnv("CARGO_PKG_NAME"))?,
        };
        let out_dir = match &self.out_dir {
            Some(dir) => dir.clone(),
            None => env_path("OUT_DIR")?,
        };
        let config_file = self
            .config_file
            .clone()
            .unwrap_or_else(|| manifest_dir.join(CONFIG_FILE));
        let root_file = self
            .root_file
            .clone()
            .unwrap_or_else(|| default_root_file(&manifest_dir));

        let config = self.merge(CodegenConfig::load(&config_file)?);
        tracing::debug!(
            target: "waymark::generator",
            ?config,
            crate_name = %crate_name,
            "generating route table"
        );

        let report = Scanner::new(&crate_name, config.marker.as_str()).scan(&root_file)?;

        let mut builder = RouteTableBuilder::new(config.duplicate_policy, config.empty_url);
        builder.extend(report.destinations)?;
        let table = builder.finish();

        let source = generator::render_module(&table, config.emit_factories, &crate_name);
        let manifest = if config.manifest {
            Some(generator::render_manifest_json(&table)?)
        } else {
            None
        };
        let artifacts = artifact::write_artifacts(&out_dir, &source, manifest.as_deref())?;

        let mut tracked_files = report.visited_files;
        // Cargo 把不存在的 rerun-if-changed 路径视为永远过期，缺省配置不登记。
        if config_file.is_file() {
            tracked_files.push(config_file);
        }

        if self.cargo_directives {
            for file in &tracked_files {
                println!("cargo:rerun-if-changed={}", file.display());
            }
            for diagnostic in &report.diagnostics {
                println!("cargo:warning={}", diagnostic.format());
            }
            println!(
                "cargo:rustc-env={}={}",
                ROUTE_TABLE_ENV,
                artifacts.source.display()
            );
        }

        Ok(GenerateOutput {
            table,
            artifacts,
            diagnostics: report.diagnostics,
            tracked_files,
        })
    }

    fn merge(&self, mut config: CodegenConfig) -> CodegenConfig {
        if let Some(marker) = &self.marker {
            config.marker = marker.clone();
        }
        if let Some(policy) = self.duplicate_policy {
            config.duplicate_policy = policy;
        }
        if let Some(policy) = self.empty_url {
            config.empty_url = policy;
        }
        if let Some(enabled) = self.emit_factories {
            config.emit_factories = enabled;
        }
        if let Some(enabled) = self.manifest {
            config.manifest = enabled;
        }
        config
    }
}

fn env_path(name: &'static str) -> Result<PathBuf, CodegenError> {
    env::var_os(name)
        .map(PathBuf::from)
        .ok_or(CodegenError::MissingEnv(name))
}

fn default_root_file(manifest_dir: &Path) -> PathBuf {
    let lib = manifest_dir.join("src").join("lib.rs");
    if lib.is_file() {
        lib
    } else {
        manifest_dir.join("src").join("main.rs")
    }
}
