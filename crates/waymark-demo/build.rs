//! 构建期扫描 `src/` 下的 `#[destination]` 标注，生成路由表源码与 JSON 清单。

fn main() {
    if let Err(err) = waymark_codegen::Builder::new().generate() {
        panic!("route table generation failed [{}]: {err}", err.code());
    }
}
