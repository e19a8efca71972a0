//! 身份 → 构造器注册表。
//!
//! # 设计初衷（Why）
//! - 路由表只记录字符串身份，运行期不做“按类型名反射实例化”，改为启动时注册构造闭包；
//! - 每次命中都重新构造组件实例，与宿主“每次跳转创建新页面”的语义一致。
//!
//! # 契约说明（What）
//! - [`ComponentFactory::create`] 不接受参数，返回全新的 [`BoxComponent`]；查询参数随后经
//!   [`Component::on_create`] 注入；
//! - 同一身份重复注册时后者覆盖前者，并输出 `warn` 日志。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::destination::Destination;
use crate::request::QueryParams;

/// 可被路由激活的组件。
pub trait Component: Send + 'static {
    /// 激活前注入初始配置（即请求 URL 中的查询参数）。
    fn on_create(&mut self, params: &QueryParams);
}

/// 装箱后的组件对象。
pub type BoxComponent = Box<dyn Component>;

/// 按需构造组件实例的工厂。
///
/// 实现需满足 `Send + Sync + 'static`，以便注册表在 `Arc` 中跨线程共享。
pub trait ComponentFactory: Send + Sync + 'static {
    fn create(&self) -> BoxComponent;
}

impl<F> ComponentFactory for F
where
    F: Fn() -> BoxComponent + Send + Sync + 'static,
{
    fn create(&self) -> BoxComponent {
        self()
    }
}

/// 启动期构建、之后只读的构造器表。
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, Arc<dyn ComponentFactory>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以显式身份注册构造器，返回是否覆盖了已有条目。
    pub fn register<F>(&mut self, identity: impl Into<String>, factory: F) -> bool
    where
        F: ComponentFactory,
    {
        let identity = identity.into();
        let replaced = self
            .factories
            .insert(identity.clone(), Arc::new(factory))
            .is_some();
        if replaced {
            tracing::warn!(target: "waymark::router", %identity, "component factory replaced");
        }
        replaced
    }

    /// 以 [`Destination::qualified_identity`] 为键注册 `Default` 构造的组件。
    ///
    /// 生成器在开启 `emit-factories` 时输出的 `register_factories` 即逐条调用本方法。
    pub fn register_destination<D>(&mut self) -> bool
    where
        D: Destination + Component + Default,
    {
        self.register(D::qualified_identity(), || -> BoxComponent {
            Box::new(D::default())
        })
    }

    pub fn get(&self, identity: &str) -> Option<&Arc<dyn ComponentFactory>> {
        self.factories.get(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.factories.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identities: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        identities.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("identities", &identities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Blank;

    impl Component for Blank {
        fn on_create(&mut self, _: &QueryParams) {}
    }

    impl Destination for Blank {
        const URL: &'static str = "router://blank";
        const DESCRIPTION: &'static str = "";

        fn qualified_identity() -> &'static str {
            "tests::Blank"
        }
    }

    #[test]
    fn register_reports_replacement() {
        let mut registry = ComponentRegistry::new();
        assert!(!registry.register("a", || -> BoxComponent { Box::new(Blank) }));
        assert!(registry.register("a", || -> BoxComponent { Box::new(Blank) }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_destination_keys_by_qualified_identity() {
        let mut registry = ComponentRegistry::new();
        registry.register_destination::<Blank>();
        assert!(registry.contains("tests::Blank"));
        assert_eq!(
            format!("{registry:?}"),
            r#"ComponentRegistry { identities: ["tests::Blank"] }"#
        );
    }
}
