//! `waymark.toml` 配置。
//!
//! 所有字段均可缺省；未知键直接报错，避免拼写错误被静默忽略。
//!
//! ```toml
//! marker = "destination"
//! duplicate-policy = "warn"   # silent | warn | fail
//! empty-url = "accept"        # accept | reject
//! emit-factories = false
//! manifest = true
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 多个声明共享同一 URL 时的处理策略。后两种策略下仍是“后处理者覆盖”。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// 静默覆盖。
    Silent,
    /// 覆盖并输出 `warn` 日志。
    #[default]
    Warn,
    /// 中止构建。
    Fail,
}

/// 空 URL 的处理策略。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyUrlPolicy {
    /// 照常写入路由表（运行期永远无法命中）。
    #[default]
    Accept,
    /// 中止构建。
    Reject,
}

/// 生成器配置。
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CodegenConfig {
    /// 标注属性名，按路径最后一段比对，`#[waymark::destination]` 同样命中。
    pub marker: String,
    pub duplicate_policy: DuplicatePolicy,
    pub empty_url: EmptyUrlPolicy,
    /// 是否额外生成 `register_factories()`；要求所有目标类型实现 `Component + Default`。
    pub emit_factories: bool,
    /// 是否在 `OUT_DIR` 写出 JSON 清单。
    pub manifest: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            marker: "destination".to_owned(),
            duplicate_policy: DuplicatePolicy::default(),
            empty_url: EmptyUrlPolicy::default(),
            emit_factories: false,
            manifest: true,
        }
    }
}

impl CodegenConfig {
    /// 解析 TOML 文本。
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// 读取配置文件；文件不存在时返回默认配置。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    target: "waymark::generator",
                    path = %path.display(),
                    "no config file, using defaults"
                );
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CodegenConfig::from_toml_str("", Path::new("waymark.toml")).expect("valid");
        assert_eq!(config, CodegenConfig::default());
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Warn);
        assert_eq!(config.empty_url, EmptyUrlPolicy::Accept);
    }

    #[test]
    fn kebab_case_keys_are_read() {
        let config = CodegenConfig::from_toml_str(
            r#"
marker = "route"
duplicate-policy = "fail"
empty-url = "reject"
emit-factories = true
manifest = false
"#,
            Path::new("waymark.toml"),
        )
        .expect("valid");
        assert_eq!(config.marker, "route");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Fail);
        assert_eq!(config.empty_url, EmptyUrlPolicy::Reject);
        assert!(config.emit_factories);
        assert!(!config.manifest);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err =
            CodegenConfig::from_toml_str("duplicate_policy = \"fail\"", Path::new("waymark.toml"))
                .expect_err("snake_case key is unknown");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CodegenConfig::load(&dir.path().join("waymark.toml")).expect("defaults");
        assert_eq!(config, CodegenConfig::default());
    }
}
