//! 二级页面。

pub mod user;
