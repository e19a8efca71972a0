//! 演示：主页 → 用户页 → 未登记的资料页。
//!
//! 运行时可用 `RUST_LOG=debug` 查看路由表装载明细。

use std::process::ExitCode;

use waymark_core::logging;
use waymark_demo::{ConsoleHost, build_router};

fn main() -> ExitCode {
    if let Err(err) = logging::install() {
        eprintln!("logging disabled: {err}");
    }

    let router = build_router();
    let host = ConsoleHost::default();

    for identity in router.unbound_identities() {
        tracing::warn!(target: "waymark::demo", %identity, "route without factory");
    }

    let urls = [
        "router://page-home",
        "router://page-user?name=imooc&message=hello",
        "router://watayouxiang/profile?name=imooc&message=hello",
    ];
    let mut failures = 0;
    for url in urls {
        match router.resolve_and_dispatch(&host, url) {
            Ok(dispatched) => println!("{url} -> {}", dispatched.identity),
            Err(err) => {
                failures += 1;
                println!("{url} -> [{}] {err}", err.code());
            }
        }
    }

    println!("history: {:?}", host.history());
    // 最后一条是预期中的未命中。
    if failures == 1 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
