//! waymark 接线示例。
//!
//! # 教案级说明
//! - **意图 (Why)**：展示一个宿主 crate 从标注到分发的完整链路：`build.rs` 调用生成器，
//!   页面类型携带 `#[destination]`，运行期包含生成产物并组装 [`Router`]；
//! - **契约 (What)**：
//!   - [`routes::route_mapping`] 与 [`routes::register_factories`] 均由构建脚本生成；
//!   - [`ROUTE_MANIFEST`] 是同一张表的 JSON 形态，内容与 `route_mapping()` 一致；
//! - **流程 (How)**：[`build_router`] 装载表、注册构造器，返回可跨线程克隆的路由器。

use std::sync::Mutex;

use waymark_core::{
    Activation, Component, ComponentRegistry, Host, HostError, QueryParams, RouteTable, Router,
};
use waymark_macros::destination;

pub mod pages;

/// 构建脚本生成的路由表访问器。
pub mod routes {
    waymark_core::include_routes!();
}

/// 构建脚本写出的 JSON 清单。
pub const ROUTE_MANIFEST: &str = include_str!(concat!(env!("OUT_DIR"), "/route_manifest.json"));

/// 应用主页。
#[destination(url = "router://page-home", description = "应用主页")]
#[derive(Debug, Default)]
pub struct MainActivity {
    params: QueryParams,
}

impl MainActivity {
    pub fn params(&self) -> &QueryParams {
        &self.params
    }
}

impl Component for MainActivity {
    fn on_create(&mut self, params: &QueryParams) {
        self.params = params.clone();
        tracing::info!(target: "waymark::demo", params = params.len(), "main page created");
    }
}

/// 装载生成的路由表并注册全部页面构造器。
pub fn build_router() -> Router {
    let table = RouteTable::from_mapping(routes::route_mapping());
    let mut registry = ComponentRegistry::new();
    routes::register_factories(&mut registry);
    Router::new(table, registry)
}

/// 把激活请求记录下来的宿主，代替真实的页面栈。
#[derive(Debug, Default)]
pub struct ConsoleHost {
    history: Mutex<Vec<String>>,
}

impl ConsoleHost {
    /// 已激活页面的身份，按激活顺序排列。
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Host for ConsoleHost {
    fn activate(&self, activation: Activation) -> Result<(), HostError> {
        tracing::info!(target: "waymark::demo", ?activation, "page shown");
        let mut history = self
            .history
            .lock()
            .map_err(|_| HostError::new("page history is poisoned"))?;
        history.push(activation.identity().to_owned());
        Ok(())
    }
}
