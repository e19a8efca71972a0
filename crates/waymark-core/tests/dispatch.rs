//! 运行期解析与分发的契约测试。
//!
//! - **Why**：路由器是编译期产物的唯一消费者，这里在不依赖构建脚本的前提下，用手工构造的
//!   路由表复现“查表命中 / 未命中 / URL 非法 / 参数透传 / 并发调用”五类场景；
//! - **How**：`CapturingHost` 记录每次激活的身份与组件在 `on_create` 中收到的参数；
//! - **What**：所有失败路径都必须以 `Err` 返回，不允许 panic。

use std::sync::{Arc, Mutex};
use std::thread;

use proptest::prelude::*;
use tracing_test::traced_test;
use waymark_core::{
    Activation, BoxComponent, Component, ComponentRegistry, DispatchError, Host, HostError,
    QueryParams, ResolutionError, RouteTable, Router,
};

/// 把 `on_create` 收到的参数写入共享槽位，供断言读取。
struct RecordingPage {
    configured: Arc<Mutex<Vec<QueryParams>>>,
}

impl Component for RecordingPage {
    fn on_create(&mut self, params: &QueryParams) {
        self.configured
            .lock()
            .expect("recorder lock poisoned")
            .push(params.clone());
    }
}

#[derive(Default)]
struct CapturingHost {
    activated: Mutex<Vec<(String, String)>>,
}

impl Host for CapturingHost {
    fn activate(&self, activation: Activation) -> Result<(), HostError> {
        self.activated
            .lock()
            .expect("host lock poisoned")
            .push((activation.identity().to_owned(), activation.url().to_owned()));
        Ok(())
    }
}

fn fixture() -> (Router, Arc<Mutex<Vec<QueryParams>>>) {
    let configured = Arc::new(Mutex::new(Vec::new()));
    let table = RouteTable::from_mapping([("router://page-home", "MainActivity")]);
    let mut registry = ComponentRegistry::new();
    let sink = Arc::clone(&configured);
    registry.register("MainActivity", move || -> BoxComponent {
        Box::new(RecordingPage {
            configured: Arc::clone(&sink),
        })
    });
    (Router::new(table, registry), configured)
}

#[test]
fn registered_url_is_activated_with_empty_query() {
    let (router, configured) = fixture();
    let host = CapturingHost::default();

    let dispatched = router
        .resolve_and_dispatch(&host, "router://page-home")
        .expect("page-home is registered");

    assert_eq!(dispatched.identity, "MainActivity");
    assert!(dispatched.params.is_empty());
    assert_eq!(
        *host.activated.lock().expect("host lock poisoned"),
        [("MainActivity".to_owned(), "router://page-home".to_owned())]
    );
    assert_eq!(*configured.lock().expect("recorder lock poisoned"), [QueryParams::new()]);
}

#[traced_test]
#[test]
fn unregistered_url_is_not_found() {
    let (router, _) = fixture();
    let host = CapturingHost::default();

    let err = router
        .resolve_and_dispatch(&host, "router://watayouxiang/profile?name=imooc&message=hello")
        .expect_err("profile is not registered");

    match err {
        DispatchError::Resolution(ResolutionError::NotFound { url, key }) => {
            assert_eq!(url, "router://watayouxiang/profile?name=imooc&message=hello");
            assert_eq!(key, "router://watayouxiang/profile");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(host.activated.lock().expect("host lock poisoned").is_empty());
    assert!(logs_contain("no destination found"));
}

#[test]
fn url_without_scheme_is_malformed() {
    let (router, _) = fixture();
    let host = CapturingHost::default();

    let err = router
        .resolve_and_dispatch(&host, "page-home")
        .expect_err("scheme missing");
    assert!(matches!(
        err.as_resolution(),
        Some(ResolutionError::MalformedUrl { .. })
    ));
    assert_eq!(err.code(), "router.malformed_url");
}

#[test]
fn query_parameters_reach_the_component() {
    let (router, configured) = fixture();
    let host = CapturingHost::default();

    let dispatched = router
        .resolve_and_dispatch(&host, "router://page-home?name=imooc&message=hello&name=ada")
        .expect("page-home is registered");

    let expected: QueryParams = [("name", "ada"), ("message", "hello")].into_iter().collect();
    assert_eq!(dispatched.params, expected);
    assert_eq!(*configured.lock().expect("recorder lock poisoned"), [expected]);
}

#[test]
fn repeated_dispatch_creates_fresh_instances() {
    let (router, configured) = fixture();
    let host = CapturingHost::default();

    for _ in 0..3 {
        router
            .resolve_and_dispatch(&host, "router://page-home")
            .expect("page-home is registered");
    }
    assert_eq!(configured.lock().expect("recorder lock poisoned").len(), 3);
    assert_eq!(host.activated.lock().expect("host lock poisoned").len(), 3);
}

#[test]
fn router_is_shared_across_threads_without_locking() {
    let (router, configured) = fixture();
    let host = Arc::new(CapturingHost::default());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let router = router.clone();
            let host = Arc::clone(&host);
            thread::spawn(move || {
                let url = format!("router://page-home?worker={i}");
                router
                    .resolve_and_dispatch(host.as_ref(), &url)
                    .expect("page-home is registered")
            })
        })
        .collect();

    for handle in handles {
        let dispatched = handle.join().expect("worker panicked");
        assert_eq!(dispatched.identity, "MainActivity");
        assert!(dispatched.params.contains_key("worker"));
    }
    assert_eq!(configured.lock().expect("recorder lock poisoned").len(), 8);
}

fn query_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-c]{1,2}", "[a-z0-9]{0,4}"), 0..12)
}

proptest! {
    /// 任意键值序列拼成查询串后，解析结果等于“按顺序写入、后者覆盖”的参考模型。
    #[test]
    fn dispatched_params_follow_last_occurrence(pairs in query_pairs()) {
        let (router, _) = fixture();
        let host = CapturingHost::default();

        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("router://page-home?{query}");

        let dispatched = router.resolve_and_dispatch(&host, &url).expect("registered");
        let expected: QueryParams = pairs.into_iter().collect();
        prop_assert_eq!(dispatched.params, expected);
    }

    /// 查表结果只取决于 URL 与路由表，与调用次数无关。
    #[test]
    fn lookup_outcome_is_stable(path in "[a-z]{1,6}") {
        let (router, _) = fixture();
        let url = format!("router://{path}");
        let first = router.resolve(&url).map(|r| r.identity.to_owned());
        let second = router.resolve(&url).map(|r| r.identity.to_owned());
        prop_assert_eq!(first, second);
    }
}
