//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义运行期解析、分发与清单装载三类失败路径，调用方据此决定回退策略；
//! - 导航失败属于可恢复结果，任何变体都不会以 panic 形式逃逸到宿主进程。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`，与 `std::error::Error` 生态兼容；
//! - 每个变体提供稳定的点分错误码（[`ResolutionError::code`] 等），供日志与告警聚合。

use thiserror::Error;

use crate::host::HostError;

/// URL 解析或查表阶段的失败。
///
/// # 契约（What）
/// - `MalformedUrl`：输入无法拆出 `scheme://namespace` 结构，`reason` 给出具体原因；
/// - `NotFound`：解析成功但路由表中不存在对应键，`key` 为实际参与比对的规范键。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ResolutionError {
    /// 输入 URL 结构不合法。
    #[error("malformed route url `{url}`: {reason}")]
    MalformedUrl { url: String, reason: &'static str },

    /// 路由表中没有匹配项。
    #[error("no destination registered for `{key}` (requested `{url}`)")]
    NotFound { url: String, key: String },
}

impl ResolutionError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            ResolutionError::MalformedUrl { .. } => "router.malformed_url",
            ResolutionError::NotFound { .. } => "router.not_found",
        }
    }

    /// 触发失败的原始 URL。
    pub fn url(&self) -> &str {
        match self {
            ResolutionError::MalformedUrl { url, .. } | ResolutionError::NotFound { url, .. } => {
                url
            }
        }
    }
}

/// `resolve_and_dispatch` 的完整失败域。
///
/// # 教案式说明
/// - **意图 (Why)**：查表命中之后仍可能因为构造器缺失或宿主拒绝激活而失败，
///   这两类问题与 URL 本身无关，需要与 [`ResolutionError`] 区分；
/// - **契约 (What)**：`Resolution` 透传解析/查表错误；`MissingFactory` 表示路由表登记了
///   身份但进程内没有注册对应构造器；`Activation` 携带宿主返回的 [`HostError`]。
#[derive(Debug, Error)]
pub enum DispatchError {
    /// 解析或查表失败。
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// 路由表中的身份没有注册构造器。
    #[error("destination `{identity}` has no registered component factory")]
    MissingFactory { identity: String },

    /// 宿主拒绝激活目标组件。
    #[error("host failed to activate `{identity}`")]
    Activation {
        identity: String,
        #[source]
        source: HostError,
    },
}

impl DispatchError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::Resolution(inner) => inner.code(),
            DispatchError::MissingFactory { .. } => "router.missing_factory",
            DispatchError::Activation { .. } => "router.activation_failed",
        }
    }

    /// 若失败源自解析/查表阶段，返回内部错误。
    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            DispatchError::Resolution(inner) => Some(inner),
            _ => None,
        }
    }
}

/// 从 JSON 清单装载路由表时的失败。
#[cfg(feature = "manifest")]
#[derive(Debug, Error)]
#[error("invalid route manifest: {0}")]
pub struct ManifestError(#[from] serde_json::Error);

#[cfg(feature = "manifest")]
impl ManifestError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        "router.manifest_invalid"
    }
}
