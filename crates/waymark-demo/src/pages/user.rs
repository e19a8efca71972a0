use waymark_core::{Component, QueryParams};
use waymark_macros::destination;

/// 用户信息页，从查询参数中读取 `name`。
#[destination(url = "router://page-user", description = "用户信息")]
#[derive(Debug, Default)]
pub struct UserActivity {
    name: Option<String>,
}

impl UserActivity {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Component for UserActivity {
    fn on_create(&mut self, params: &QueryParams) {
        self.name = params.get("name").map(str::to_owned);
        tracing::info!(target: "waymark::demo", name = ?self.name, "user page created");
    }
}
