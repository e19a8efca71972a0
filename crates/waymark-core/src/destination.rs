use serde::{Deserialize, Serialize};

/// 单个可路由组件的声明信息：`(url, description, qualified_identity)` 三元组。
///
/// # 教案级说明
/// - **来源 (Where)**：编译期由扫描器从 `#[destination(..)]` 标注中提取，或运行期经
///   [`Destination::metadata`] 由类型自身给出；两条路径得到的 `qualified_identity` 一致；
/// - **契约 (What)**：三个字段均为只读；`url` 允许为空串（宽松默认值），是否拒绝由生成器策略决定；
/// - **生命周期**：仅在扫描与生成阶段短暂存在，JSON 清单是它唯一的持久化形态。
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DestinationMetadata {
    url: String,
    description: String,
    qualified_identity: String,
}

impl DestinationMetadata {
    pub fn new(
        url: impl Into<String>,
        description: impl Into<String>,
        qualified_identity: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
            qualified_identity: qualified_identity.into(),
        }
    }

    /// 路由键。
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 面向人的描述，不参与任何运行期行为。
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 声明类型的全限定名，形如 `my_app::pages::UserPage`。
    pub fn qualified_identity(&self) -> &str {
        &self.qualified_identity
    }
}

/// 由 `#[destination(url = "...", description = "...")]` 自动实现的类型级路由身份。
///
/// 每个类型至多声明一个身份。`qualified_identity` 与 `module_path!()` 的拼接结果相同，
/// 构建期扫描器按同一规则推导，因此可以直接用作 [`ComponentRegistry`](crate::ComponentRegistry)
/// 的键。
pub trait Destination {
    /// 路由键。
    const URL: &'static str;
    /// 描述文本。
    const DESCRIPTION: &'static str;

    /// 全限定类型名。
    fn qualified_identity() -> &'static str;

    /// 组装完整元数据。
    fn metadata() -> DestinationMetadata {
        DestinationMetadata::new(Self::URL, Self::DESCRIPTION, Self::qualified_identity())
    }
}
