//! 构建期错误域。
//!
//! 这里的每个变体都是构建致命错误：运行期路由器依赖生成产物存在且内容完整，
//! 构建脚本拿到任何 `CodegenError` 都应立即中止本次构建，而不是降级继续。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 配置文件装载失败。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 扫描、生成与写盘阶段的失败。
#[derive(Debug, Error)]
pub enum CodegenError {
    /// 读写文件失败。
    #[error("i/o failure on `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 源文件无法被 `syn` 解析。
    #[error("failed to parse `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    /// `mod x;` 声明找不到对应文件。
    #[error("module `{module}` declared in `{declared_in}` has no source file (tried {candidates:?})")]
    ModuleNotFound {
        module: String,
        declared_in: PathBuf,
        candidates: Vec<PathBuf>,
    },

    /// 同一 URL 被多个类型声明，且策略为 `fail`。
    #[error("url `{url}` is declared by both `{first}` and `{second}`")]
    DuplicateUrl {
        url: String,
        first: String,
        second: String,
    },

    /// 空 URL 且策略为 `reject`。
    #[error("destination `{identity}` declares an empty url")]
    EmptyUrl { identity: String },

    /// 配置文件错误。
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON 清单序列化失败。
    #[error("failed to render route manifest")]
    Manifest(#[from] serde_json::Error),

    /// 构建脚本环境缺少必需变量。
    #[error("environment variable `{0}` is not set; is this running inside a build script?")]
    MissingEnv(&'static str),
}

impl CodegenError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            CodegenError::Io { .. } => "codegen.io",
            CodegenError::Parse { .. } => "codegen.parse",
            CodegenError::ModuleNotFound { .. } => "codegen.module_not_found",
            CodegenError::DuplicateUrl { .. } => "codegen.duplicate_url",
            CodegenError::EmptyUrl { .. } => "codegen.empty_url",
            CodegenError::Config(_) => "codegen.config",
            CodegenError::Manifest(_) => "codegen.manifest",
            CodegenError::MissingEnv(_) => "codegen.missing_env",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CodegenError::Io {
            path: path.into(),
            source,
        }
    }
}
