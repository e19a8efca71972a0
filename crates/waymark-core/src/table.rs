//! 进程级只读路由表。
//!
//! # 教案级说明
//! - **意图 (Why)**：构建期生成的 `route_mapping()` 是编译期与运行期之间唯一的交接通道，
//!   本模块负责在进程启动时一次性装载它，并为每个登记 URL 预先计算规范查表键；
//! - **契约 (What)**：装载后不再修改，跨线程共享时无需同步；登记 URL 无法解析时仍保留在
//!   [`RouteTable::iter`] 中，但永远不会被命中；
//! - **流程 (How)**：
//!   1. 按登记 URL 排序，保证规范键冲突时“后者覆盖”的结果与 `HashMap` 迭代顺序无关；
//!   2. 逐条用 [`RouteRequest::parse`] 计算规范键，写入索引；
//!   3. 输出一条 `info` 汇总与逐条 `debug` 明细。

use std::collections::{BTreeMap, HashMap};

use crate::request::RouteRequest;

/// 不可变的 `url → qualified identity` 映射。
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    /// 登记原文 → 身份，键唯一。
    entries: BTreeMap<String, String>,
    /// 规范查表键 → 登记原文。
    index: HashMap<String, String>,
}

impl RouteTable {
    /// 空表，所有查询都会返回 `None`。
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由生成的映射装载路由表。
    pub fn from_mapping<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: BTreeMap<String, String> = mapping
            .into_iter()
            .map(|(url, identity)| (url.into(), identity.into()))
            .collect();

        let mut index = HashMap::with_capacity(entries.len());
        for (url, identity) in &entries {
            match RouteRequest::parse(url) {
                Ok(request) => {
                    let key = request.lookup_key();
                    tracing::debug!(target: "waymark::router", %key, %identity, "route loaded");
                    if let Some(previous) = index.insert(key.clone(), url.clone()) {
                        tracing::warn!(
                            target: "waymark::router",
                            %key,
                            shadowed = %previous,
                            winner = %url,
                            "two registered urls share one lookup key; the later one wins"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        target: "waymark::router",
                        url = %url,
                        %identity,
                        error = %err,
                        "registered url is not routable and will never match"
                    );
                }
            }
        }

        tracing::info!(target: "waymark::router", routes = entries.len(), "route table loaded");
        Self { entries, index }
    }

    /// 从 JSON 清单装载路由表。
    ///
    /// 清单格式为 `[{"url", "description", "qualified_identity"}]`，与生成器输出一致；
    /// 重复 URL 以数组中靠后的条目为准。
    #[cfg(feature = "manifest")]
    pub fn from_manifest_json(json: &str) -> Result<Self, crate::error::ManifestError> {
        let destinations: Vec<crate::DestinationMetadata> = serde_json::from_str(json)?;
        let mut mapping = BTreeMap::new();
        for destination in destinations {
            mapping.insert(
                destination.url().to_owned(),
                destination.qualified_identity().to_owned(),
            );
        }
        Ok(Self::from_mapping(mapping))
    }

    /// 以已解析请求查表。
    pub fn lookup(&self, request: &RouteRequest) -> Option<&str> {
        self.lookup_key(&request.lookup_key())
    }

    /// 以规范键查表。
    pub fn lookup_key(&self, key: &str) -> Option<&str> {
        let url = self.index.get(key)?;
        self.entries.get(url).map(String::as_str)
    }

    /// 按登记原文精确读取。
    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按登记原文的字典序遍历 `(url, identity)`。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 去重后的身份集合。
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        let mut identities: Vec<&str> = self.entries.values().map(String::as_str).collect();
        identities.sort_unstable();
        identities.dedup();
        identities.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_query_on_both_sides() {
        let table = RouteTable::from_mapping([("router://page-user?tab=1", "app::UserActivity")]);
        let request = RouteRequest::parse("router://page-user?id=3").expect("well-formed");
        assert_eq!(table.lookup(&request), Some("app::UserActivity"));
        assert_eq!(table.get("router://page-user?tab=1"), Some("app::UserActivity"));
    }

    #[test]
    fn unroutable_entries_are_kept_but_never_match() {
        let table = RouteTable::from_mapping([("", "app::Blank"), ("router://a", "app::A")]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(""), Some("app::Blank"));
        assert_eq!(table.lookup_key(""), None);
        assert_eq!(table.lookup_key("router://a"), Some("app::A"));
    }

    #[test]
    fn shared_lookup_key_resolves_to_later_url() {
        // "router://a?x=1" 在字典序上晚于 "router://a"，因此胜出。
        let table = RouteTable::from_mapping([
            ("router://a?x=1", "app::Second"),
            ("router://a", "app::First"),
        ]);
        assert_eq!(table.lookup_key("router://a"), Some("app::Second"));
    }

    #[test]
    fn identities_are_deduplicated() {
        let table = RouteTable::from_mapping([
            ("router://a", "app::Shared"),
            ("router://b", "app::Shared"),
            ("router://c", "app::Other"),
        ]);
        let identities: Vec<&str> = table.identities().collect();
        assert_eq!(identities, ["app::Other", "app::Shared"]);
    }

    #[cfg(feature = "manifest")]
    #[test]
    fn loads_from_manifest_json() {
        let json = r#"[
            {"url": "router://page-home", "description": "home", "qualified_identity": "app::MainActivity"},
            {"url": "router://page-home", "description": "dup", "qualified_identity": "app::Replacement"}
        ]"#;
        let table = RouteTable::from_manifest_json(json).expect("valid manifest");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("router://page-home"), Some("app::Replacement"));
        assert!(RouteTable::from_manifest_json("{").is_err());
    }
}
