//! # waymark-core
//!
//! ## 定位与职责（Why）
//! - 承接构建期生成的 `url → 全限定身份` 映射，在运行期完成 URL 解析、精确查表、
//!   组件构造与宿主交接；
//! - 编译期与运行期之间只有一条交接通道：生成器写出的 `route_mapping()` 访问器
//!   （或同源的 JSON 清单），本 crate 不依赖任何运行期反射。
//!
//! ## 模块地图（Where）
//! - [`destination`]：声明元数据与 `#[destination]` 实现的 [`Destination`] 特征；
//! - [`request`]：URL 拆解与扁平查询参数；
//! - [`table`]：进程级只读路由表；
//! - [`component`]：身份 → 构造器注册表；
//! - [`host`]：与宿主环境的激活交接面；
//! - [`router`]：解析 + 分发入口；
//! - [`error`]：运行期错误域。
//!
//! ## 典型接线（How）
//! ```ignore
//! mod routes {
//!     waymark_core::include_routes!();
//! }
//!
//! let table = waymark_core::RouteTable::from_mapping(routes::route_mapping());
//! let router = waymark_core::Router::new(table, registry);
//! router.resolve_and_dispatch(&host, "router://page-home")?;
//! ```

pub mod component;
pub mod destination;
pub mod error;
pub mod host;
#[cfg(feature = "subscriber")]
pub mod logging;
pub mod request;
pub mod router;
pub mod table;

pub use component::{BoxComponent, Component, ComponentFactory, ComponentRegistry};
pub use destination::{Destination, DestinationMetadata};
#[cfg(feature = "manifest")]
pub use error::ManifestError;
pub use error::{DispatchError, ResolutionError};
pub use host::{Activation, Host, HostError};
pub use request::{QueryParams, RouteRequest};
pub use router::{DispatchResult, Dispatched, ResolvedRoute, Router};
pub use table::RouteTable;

/// 构建脚本导出生成产物路径时使用的环境变量名。
pub const ROUTE_TABLE_ENV: &str = "WAYMARK_ROUTE_TABLE";

/// 在当前模块内展开生成的路由表源码。
///
/// 依赖构建脚本通过 `cargo:rustc-env=WAYMARK_ROUTE_TABLE=<path>` 导出产物路径，
/// 展开后当前模块获得 `route_mapping()`（以及开启 `emit-factories` 时的
/// `register_factories()`）。
#[macro_export]
macro_rules! include_routes {
    () => {
        include!(env!("WAYMARK_ROUTE_TABLE"));
    };
}
