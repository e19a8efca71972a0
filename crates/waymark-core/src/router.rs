use std::sync::Arc;

use crate::component::ComponentRegistry;
use crate::error::{DispatchError, ResolutionError};
use crate::host::{Activation, Host};
use crate::request::{QueryParams, RouteRequest};
use crate::table::RouteTable;

/// 一次成功查表的结果。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedRoute<'a> {
    /// 命中的全限定身份。
    pub identity: &'a str,
    /// 解析后的请求。
    pub request: RouteRequest,
}

/// 成功分发后的回执。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dispatched {
    pub identity: String,
    pub url: String,
    pub params: QueryParams,
}

/// `resolve_and_dispatch` 的返回类型。
pub type DispatchResult = Result<Dispatched, DispatchError>;

/// 运行期解析与分发入口。
///
/// # 设计动机（Why）
/// - 路由表在启动时装载一次，之后只读；路由器本身不持有任何可变状态，
///   因此 `Clone` 后可在多个线程中并发调用而无需加锁；
/// - 不使用进程级单例：调用方在启动时显式构造并向下传递。
///
/// # 行为概览（How）
/// 1. 解析 URL，失败返回 [`ResolutionError::MalformedUrl`]；
/// 2. 以规范键精确查表，未命中返回 [`ResolutionError::NotFound`]；
/// 3. 取出身份对应的构造器，构造新实例并注入查询参数；
/// 4. 把 [`Activation`] 交给宿主，返回 [`Dispatched`] 回执。
///
/// # 使用契约（What）
/// - 同一 URL 在路由表不变时查表结果恒定；每次成功分发都会产生新的组件实例；
/// - 任何失败都以 `Err` 返回，不会 panic，也不做重试。
#[derive(Clone, Debug)]
pub struct Router {
    table: Arc<RouteTable>,
    registry: Arc<ComponentRegistry>,
}

impl Router {
    pub fn new(table: RouteTable, registry: ComponentRegistry) -> Self {
        Self::from_shared(Arc::new(table), Arc::new(registry))
    }

    /// 复用已共享的路由表与注册表。
    pub fn from_shared(table: Arc<RouteTable>, registry: Arc<ComponentRegistry>) -> Self {
        let router = Self { table, registry };
        let unbound = router.unbound_identities();
        if !unbound.is_empty() {
            tracing::warn!(
                target: "waymark::router",
                identities = ?unbound,
                "route table references identities without a component factory"
            );
        }
        router
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// 路由表中登记、但未注册构造器的身份。
    pub fn unbound_identities(&self) -> Vec<&str> {
        self.table
            .identities()
            .filter(|identity| !self.registry.contains(identity))
            .collect()
    }

    /// 只解析与查表，不构造也不激活。
    pub fn resolve(&self, url: &str) -> Result<ResolvedRoute<'_>, ResolutionError> {
        let request = RouteRequest::parse(url)?;
        match self.table.lookup(&request) {
            Some(identity) => Ok(ResolvedRoute { identity, request }),
            None => Err(ResolutionError::NotFound {
                url: url.to_owned(),
                key: request.lookup_key(),
            }),
        }
    }

    /// 解析 URL、构造目标组件并交由宿主激活。
    pub fn resolve_and_dispatch<H>(&self, host: &H, url: &str) -> DispatchResult
    where
        H: Host + ?Sized,
    {
        let resolved = self.resolve(url).inspect_err(|err| {
            tracing::warn!(
                target: "waymark::router",
                url,
                code = err.code(),
                "no destination found: {err}"
            );
        })?;
        let identity = resolved.identity.to_owned();
        let params = resolved.request.into_query();

        let Some(factory) = self.registry.get(&identity) else {
            tracing::error!(
                target: "waymark::router",
                %identity,
                url,
                "destination has no component factory"
            );
            return Err(DispatchError::MissingFactory { identity });
        };

        let mut component = factory.create();
        component.on_create(&params);

        let activation =
            Activation::new(identity.clone(), url.to_owned(), params.clone(), component);
        host.activate(activation).map_err(|source| {
            tracing::error!(
                target: "waymark::router",
                %identity,
                url,
                error = %source,
                "host rejected activation"
            );
            DispatchError::Activation {
                identity: identity.clone(),
                source,
            }
        })?;

        tracing::info!(
            target: "waymark::router",
            %identity,
            url,
            params = params.len(),
            "destination activated"
        );
        Ok(Dispatched {
            identity,
            url: url.to_owned(),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::component::{BoxComponent, Component};
    use crate::host::HostError;

    struct Page;

    impl Component for Page {
        fn on_create(&mut self, _: &QueryParams) {}
    }

    #[derive(Default)]
    struct RecordingHost {
        seen: Mutex<Vec<String>>,
    }

    impl Host for RecordingHost {
        fn activate(&self, activation: Activation) -> Result<(), HostError> {
            self.seen
                .lock()
                .expect("host lock poisoned")
                .push(activation.identity().to_owned());
            Ok(())
        }
    }

    struct RefusingHost;

    impl Host for RefusingHost {
        fn activate(&self, _: Activation) -> Result<(), HostError> {
            Err(HostError::new("screen stack is frozen"))
        }
    }

    fn router() -> Router {
        let table = RouteTable::from_mapping([
            ("router://page-home", "app::MainActivity"),
            ("router://page-user", "app::UserActivity"),
        ]);
        let mut registry = ComponentRegistry::new();
        registry.register("app::MainActivity", || -> BoxComponent { Box::new(Page) });
        Router::new(table, registry)
    }

    #[test]
    fn resolve_does_not_need_a_factory() {
        let router = router();
        let resolved = router.resolve("router://page-user?id=1").expect("registered");
        assert_eq!(resolved.identity, "app::UserActivity");
        assert_eq!(resolved.request.query().get("id"), Some("1"));
    }

    #[test]
    fn dispatch_without_factory_is_reported() {
        let router = router();
        let host = RecordingHost::default();
        let err = router
            .resolve_and_dispatch(&host, "router://page-user")
            .expect_err("no factory registered");
        assert!(matches!(
            err,
            DispatchError::MissingFactory { ref identity } if identity == "app::UserActivity"
        ));
        assert!(host.seen.lock().expect("host lock poisoned").is_empty());
        assert_eq!(router.unbound_identities(), ["app::UserActivity"]);
    }

    #[test]
    fn host_refusal_is_wrapped() {
        let router = router();
        let err = router
            .resolve_and_dispatch(&RefusingHost, "router://page-home")
            .expect_err("host refuses");
        assert_eq!(err.code(), "router.activation_failed");
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("screen stack is frozen".to_owned())
        );
    }

    #[test]
    fn dispatch_through_trait_object() {
        let router = router();
        let host = RecordingHost::default();
        let dyn_host: &dyn Host = &host;
        let dispatched = router
            .resolve_and_dispatch(dyn_host, "router://page-home")
            .expect("registered with factory");
        assert_eq!(dispatched.identity, "app::MainActivity");
        assert_eq!(*host.seen.lock().expect("host lock poisoned"), ["app::MainActivity"]);
    }
}
