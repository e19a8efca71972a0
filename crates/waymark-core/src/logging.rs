//! 进程级日志安装入口（需开启 `subscriber` 特性）。
//!
//! 库代码只通过 `tracing` 宏输出事件，是否以及如何落地由宿主决定；本模块为不想自行拼装
//! `tracing-subscriber` 的宿主提供一键安装。

use std::sync::OnceLock;

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// 日志安装失败的原因。
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `install` 被重复调用。
    #[error("waymark logging is already installed")]
    AlreadyInstalled,
    /// 外部提前设置了全局 Subscriber。
    #[error("a global tracing subscriber is already set")]
    SubscriberAlreadySet,
    /// 设置全局 Subscriber 的底层失败。
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] dispatcher::SetGlobalDefaultError),
}

impl LoggingError {
    /// 稳定错误码，供宿主分类处理。
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::AlreadyInstalled => "logging.already_installed",
            LoggingError::SubscriberAlreadySet => "logging.subscriber_already_set",
            LoggingError::SetGlobalSubscriber(_) => "logging.set_global_failed",
        }
    }
}

/// 安装 `fmt + EnvFilter` 全局 Subscriber。
///
/// # 契约（What）
/// - 过滤规则取自 `RUST_LOG`，缺省为 `info`；
/// - 输出写往 stderr，避免污染构建脚本的 stdout 协议行；
/// - 每个进程只能成功安装一次，重复调用返回 [`LoggingError::AlreadyInstalled`]；
/// - 宿主已自行设置全局 Subscriber 时返回 [`LoggingError::SubscriberAlreadySet`]，
///   不覆盖既有设置。
pub fn install() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Err(LoggingError::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(LoggingError::SubscriberAlreadySet);
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)?;

    INSTALLED.set(()).map_err(|_| LoggingError::AlreadyInstalled)
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
