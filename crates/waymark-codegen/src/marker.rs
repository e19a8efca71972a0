//! `#[destination(url = "...", description = "...")]` 参数解析。
//!
//! 过程宏与构建期扫描器共用这一份解析逻辑，保证两条路径读出的 `url`/`description`
//! 完全一致。
//!
//! # 宽松默认值
//! - 缺失的 `url`/`description` 读作空串；
//! - 值不是字符串字面量（例如 `url = 42`、`url = CONST`）同样读作空串；
//! - 只有未知属性名会被拒绝。

use proc_macro2::TokenStream;
use syn::parse::Parser;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token};

/// 标注携带的两项参数。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MarkerArgs {
    pub url: String,
    pub description: String,
}

impl MarkerArgs {
    /// 解析属性括号内的 token，即过程宏收到的 `attr` 参数。
    pub fn parse_args(tokens: TokenStream) -> syn::Result<Self> {
        let mut args = MarkerArgs::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("url") {
                args.url = lenient_string(&meta)?;
                Ok(())
            } else if meta.path.is_ident("description") {
                args.description = lenient_string(&meta)?;
                Ok(())
            } else {
                Err(meta.error("unsupported destination property, expected `url` or `description`"))
            }
        });
        parser.parse2(tokens)?;
        Ok(args)
    }

    /// 从源码中的完整属性读取参数。
    pub fn from_attribute(attr: &Attribute) -> syn::Result<Self> {
        match &attr.meta {
            Meta::Path(_) => Ok(MarkerArgs::default()),
            Meta::List(list) => Self::parse_args(list.tokens.clone()),
            Meta::NameValue(name_value) => Err(syn::Error::new_spanned(
                name_value,
                "expected `#[destination(url = \"...\", description = \"...\")]`",
            )),
        }
    }
}

/// 判断属性路径的最后一段是否等于标注名。
pub fn is_marker(attr: &Attribute, marker: &str) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == marker)
}

fn lenient_string(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    if !meta.input.peek(Token![=]) {
        return Ok(String::new());
    }
    let expr: Expr = meta.value()?.parse()?;
    Ok(match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(literal),
            ..
        }) => literal.value(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn reads_both_fields() {
        let attr: Attribute =
            parse_quote!(#[destination(url = "router://page-home", description = "应用主页")]);
        let args = MarkerArgs::from_attribute(&attr).expect("valid marker");
        assert_eq!(args.url, "router://page-home");
        assert_eq!(args.description, "应用主页");
    }

    #[test]
    fn missing_or_non_literal_values_become_empty() {
        let attr: Attribute = parse_quote!(#[destination(url = HOME_URL)]);
        assert_eq!(MarkerArgs::from_attribute(&attr).expect("lenient"), MarkerArgs::default());

        let attr: Attribute = parse_quote!(#[destination(description, url = 7)]);
        assert_eq!(MarkerArgs::from_attribute(&attr).expect("lenient"), MarkerArgs::default());

        let attr: Attribute = parse_quote!(#[destination]);
        assert_eq!(MarkerArgs::from_attribute(&attr).expect("lenient"), MarkerArgs::default());
    }

    #[test]
    fn unknown_property_is_rejected() {
        let attr: Attribute = parse_quote!(#[destination(uri = "router://x")]);
        let err = MarkerArgs::from_attribute(&attr).expect_err("unknown key");
        assert!(err.to_string().contains("unsupported destination property"));
    }

    #[test]
    fn marker_matches_last_path_segment() {
        let plain: Attribute = parse_quote!(#[destination(url = "a")]);
        let qualified: Attribute = parse_quote!(#[waymark::destination(url = "a")]);
        let other: Attribute = parse_quote!(#[derive(Default)]);
        assert!(is_marker(&plain, "destination"));
        assert!(is_marker(&qualified, "destination"));
        assert!(!is_marker(&other, "destination"));
    }
}
