//! waymark 过程宏入口。
//!
//! # 设计意图（Why）
//! - `#[destination(url = "...", description = "...")]` 把一个类型声明为可路由组件；
//! - 标注同时服务于两条通道：构建期扫描器读取源码中的标注生成路由表，
//!   过程宏在编译期为类型实现 `waymark_core::Destination`，两者共用
//!   `waymark_codegen::marker` 的参数解析，读出的 `url`/`description` 完全一致。
//!
//! # 集成方式（How）
//! - 宿主 crate 需要直接依赖 `waymark-core`，展开结果通过 `::waymark_core` 绝对路径引用特征；
//! - 全限定身份由 `module_path!()` 与类型名拼接，与扫描器推导的身份逐字相同。

use proc_macro::TokenStream;
use quote::quote;
use syn::{Error, Generics, Ident, Item, parse_macro_input, spanned::Spanned};
use waymark_codegen::MarkerArgs;

/// 声明类型的路由身份。
///
/// # 语义说明（What）
/// - **输入**：`struct`、`enum` 或 `union` 声明；参数 `url`、`description` 均可省略，
///   省略或非字符串字面量时读作空串；
/// - **输出**：原样保留声明，并追加 `impl ::waymark_core::Destination`；
/// - **拒绝**：未知参数名，或标注在其他条目上。
///
/// # 风险提示（Trade-offs）
/// - 同一类型只能实现一次 `Destination`，重复标注会在编译期以冲突实现报错；
/// - 泛型类型的所有实例共享同一身份。
#[proc_macro_attribute]
pub fn destination(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match MarkerArgs::parse_args(attr.into()) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };
    let item = parse_macro_input!(item as Item);
    expand_destination(args, item)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_destination(args: MarkerArgs, item: Item) -> Result<proc_macro2::TokenStream, Error> {
    let (ident, generics) = match &item {
        Item::Struct(item) => (&item.ident, &item.generics),
        Item::Enum(item) => (&item.ident, &item.generics),
        Item::Union(item) => (&item.ident, &item.generics),
        other => {
            return Err(Error::new(
                other.span(),
                "#[destination] 仅可标注在 struct / enum / union 声明上",
            ));
        }
    };
    let destination_impl = render_impl(&args, ident, generics);

    Ok(quote! {
        #item
        #destination_impl
    })
}

fn render_impl(args: &MarkerArgs, ident: &Ident, generics: &Generics) -> proc_macro2::TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let url = &args.url;
    let description = &args.description;

    quote! {
        impl #impl_generics ::waymark_core::Destination for #ident #ty_generics #where_clause {
            const URL: &'static str = #url;
            const DESCRIPTION: &'static str = #description;

            fn qualified_identity() -> &'static str {
                ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#ident))
            }
        }
    }
}
