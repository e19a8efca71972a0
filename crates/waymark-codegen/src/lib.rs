//! # waymark-codegen
//!
//! ## 定位与职责（Why）
//! - 在宿主 crate 的构建脚本中运行：扫描带 `#[destination]` 标注的类型，把
//!   `url → 全限定身份` 映射渲染成可被 `include!` 的 Rust 源码；
//! - 运行期不需要反射或启动期扫描，路由表在编译前即已确定。
//!
//! ## 模块地图（Where）
//! - [`marker`]：标注参数解析，过程宏与扫描器共用；
//! - [`scanner`]：沿模块树收集声明；
//! - [`generator`]：折叠重复、应用策略、渲染源码与 JSON 清单；
//! - [`artifact`]：写入 `OUT_DIR` 并清理旧产物；
//! - [`config`]：`waymark.toml`；
//! - [`build`]：构建脚本入口 [`Builder`]；
//! - [`error`]：构建期错误域。
//!
//! ## 用法（How）
//! ```ignore
//! // build.rs
//! fn main() {
//!     if let Err(err) = waymark_codegen::Builder::new().generate() {
//!         panic!("route table generation failed: {err}");
//!     }
//! }
//! ```

pub mod artifact;
pub mod build;
pub mod config;
pub mod error;
pub mod generator;
pub mod marker;
pub mod scanner;

pub use artifact::WrittenArtifacts;
pub use build::{Builder, GenerateOutput};
pub use config::{CodegenConfig, DuplicatePolicy, EmptyUrlPolicy};
pub use error::{CodegenError, ConfigError};
pub use generator::{GeneratedTable, RouteTableBuilder};
pub use marker::MarkerArgs;
pub use scanner::{ScanDiagnostic, ScanReport, Scanner};
