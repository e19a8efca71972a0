//! 宿主环境交接面。
//!
//! 路由器只负责“定位 + 构造 + 注入参数”，组件的展示与生命周期完全由宿主掌控。
//! 交接是一次性的：路由器调用 [`Host::activate`] 后立即返回，不等待也不取消宿主内部的
//! 异步调度。

use std::fmt;

use thiserror::Error;

use crate::component::BoxComponent;
use crate::request::QueryParams;

/// 交给宿主的一次激活请求。
pub struct Activation {
    identity: String,
    url: String,
    params: QueryParams,
    component: BoxComponent,
}

impl Activation {
    pub(crate) fn new(
        identity: String,
        url: String,
        params: QueryParams,
        component: BoxComponent,
    ) -> Self {
        Self {
            identity,
            url,
            params,
            component,
        }
    }

    /// 目标组件的全限定身份。
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// 触发本次激活的原始 URL。
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 已注入组件的查询参数副本。
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// 取出已完成初始配置的组件。
    pub fn into_component(self) -> BoxComponent {
        self.component
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("identity", &self.identity)
            .field("url", &self.url)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// 宿主拒绝激活时返回的错误。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 宿主环境：接收已构造好的组件并负责呈现。
pub trait Host {
    fn activate(&self, activation: Activation) -> Result<(), HostError>;
}

impl<H: Host + ?Sized> Host for &H {
    fn activate(&self, activation: Activation) -> Result<(), HostError> {
        (**self).activate(activation)
    }
}
