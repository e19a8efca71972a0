//! 路由 URL 的拆解：`scheme://namespace/path?key=value&...`。
//!
//! # 契约（What）
//! - `scheme` 必须以 ASCII 字母开头，后续仅允许字母、数字与 `+ - .`；
//! - `scheme` 之后必须紧跟 `://`，`namespace` 不可为空；
//! - `path` 原样保留（含前导 `/`，可为空），不做尾斜杠归一化；
//! - 查询串为扁平键值，值经过百分号解码，重复键后者覆盖前者；
//! - `#fragment` 不参与查表，也不进入查询参数。

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use crate::error::ResolutionError;

/// 扁平查询参数集合，键唯一。
///
/// 底层使用 `BTreeMap`，遍历顺序与插入顺序无关且稳定。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryParams {
    entries: BTreeMap<String, String>,
}

impl QueryParams {
    /// 创建空集合。
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析查询串（不含 `?`）。
    ///
    /// # 逻辑（How）
    /// - 以 `&` 切分，跳过空片段；
    /// - 每个片段在第一个 `=` 处拆分，缺少 `=` 时值为空串；
    /// - 键与值分别百分号解码，解码结果不是合法 UTF-8 时保留原文；
    /// - 空键直接丢弃。
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&').filter(|segment| !segment.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            if key.is_empty() {
                continue;
            }
            params.insert(key, decode_component(value));
        }
        params
    }

    /// 写入一对参数，返回被覆盖的旧值。
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// 按键读取。
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按键的字典序遍历。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for QueryParams {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_owned(),
    }
}

/// 单次路由请求的解析结果，随调用创建、分发后丢弃。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteRequest {
    raw: String,
    scheme: String,
    namespace: String,
    path: String,
    query: QueryParams,
}

impl RouteRequest {
    /// 解析原始 URL。
    ///
    /// # 错误
    /// 结构不合法时返回 [`ResolutionError::MalformedUrl`]。
    pub fn parse(url: &str) -> Result<Self, ResolutionError> {
        let malformed = |reason| ResolutionError::MalformedUrl {
            url: url.to_owned(),
            reason,
        };

        let trimmed = url.trim();
        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| malformed("missing `://` after scheme"))?;
        validate_scheme(scheme).map_err(malformed)?;

        // 先剥离 fragment，再拆查询串，避免 `#` 之后的 `?` 被误认成查询起点。
        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (location, query) = rest.split_once('?').unwrap_or((rest, ""));

        let (namespace, path) = match location.find('/') {
            Some(index) => location.split_at(index),
            None => (location, ""),
        };
        if namespace.is_empty() {
            return Err(malformed("empty namespace"));
        }

        Ok(Self {
            raw: url.to_owned(),
            scheme: scheme.to_owned(),
            namespace: namespace.to_owned(),
            path: path.to_owned(),
            query: QueryParams::parse(query),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// 参与查表的规范键：`scheme://namespace/path`，不含查询串与 fragment。
    pub fn lookup_key(&self) -> String {
        format!("{}://{}{}", self.scheme, self.namespace, self.path)
    }

    /// 拆出查询参数，消费请求本身。
    pub fn into_query(self) -> QueryParams {
        self.query
    }
}

impl fmt::Display for RouteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn validate_scheme(scheme: &str) -> Result<(), &'static str> {
    let mut chars = scheme.chars();
    match chars.next() {
        None => return Err("empty scheme"),
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err("scheme must start with an ASCII letter");
        }
        Some(_) => {}
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Ok(())
    } else {
        Err("scheme contains invalid characters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheme_namespace_and_path() {
        let request = RouteRequest::parse("router://watayouxiang/profile?name=imooc&message=hello")
            .expect("well-formed url");
        assert_eq!(request.scheme(), "router");
        assert_eq!(request.namespace(), "watayouxiang");
        assert_eq!(request.path(), "/profile");
        assert_eq!(request.lookup_key(), "router://watayouxiang/profile");
        assert_eq!(request.query().get("name"), Some("imooc"));
        assert_eq!(request.query().get("message"), Some("hello"));
    }

    #[test]
    fn namespace_only_url_has_empty_path() {
        let request = RouteRequest::parse("router://page-home").expect("well-formed url");
        assert_eq!(request.namespace(), "page-home");
        assert_eq!(request.path(), "");
        assert!(request.query().is_empty());
        assert_eq!(request.lookup_key(), "router://page-home");
    }

    #[test]
    fn trailing_slash_is_kept_verbatim() {
        let request = RouteRequest::parse("router://page-home/").expect("well-formed url");
        assert_eq!(request.lookup_key(), "router://page-home/");
    }

    #[test]
    fn fragment_is_dropped() {
        let request = RouteRequest::parse("router://page-user?id=7#top?x=1").expect("well-formed");
        assert_eq!(request.lookup_key(), "router://page-user");
        assert_eq!(request.query().get("id"), Some("7"));
        assert!(!request.query().contains_key("x"));
    }

    #[test]
    fn malformed_urls_are_reported() {
        for (input, reason) in [
            ("page-home", "missing `://` after scheme"),
            ("://page-home", "empty scheme"),
            ("1router://page-home", "scheme must start with an ASCII letter"),
            ("rou ter://page-home", "scheme contains invalid characters"),
            ("router:///profile", "empty namespace"),
            ("router://?a=b", "empty namespace"),
        ] {
            match RouteRequest::parse(input) {
                Err(ResolutionError::MalformedUrl { url, reason: actual }) => {
                    assert_eq!(url, input);
                    assert_eq!(actual, reason, "input `{input}`");
                }
                other => panic!("expected MalformedUrl for `{input}`, got {other:?}"),
            }
        }
    }

    #[test]
    fn query_last_occurrence_wins() {
        let params = QueryParams::parse("a=1&b=2&a=3");
        assert_eq!(params.get("a"), Some("3"));
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn query_tolerates_loose_segments() {
        let params = QueryParams::parse("&flag&=orphan&k=v=w&&");
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("k"), Some("v=w"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let params = QueryParams::parse("msg=hello%20world&name=%E5%BC%A0&bad=%FF");
        assert_eq!(params.get("msg"), Some("hello world"));
        assert_eq!(params.get("name"), Some("张"));
        assert_eq!(params.get("bad"), Some("%FF"));
    }
}
