//! 通用常量与轴标签.

use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 成像空间的轴 (维度) 标签.
///
/// 图像堆栈按照 `(ROUND, CH, Z, Y, X)` 的顺序组织.
/// 其中只有 `Round`, `Ch`, `Z` 参与 tile 级别的遍历.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Indices {
    /// 成像轮次.
    Round,

    /// 荧光通道.
    Ch,

    /// z 层.
    Z,

    /// 垂直方向.
    Y,

    /// 水平方向.
    X,
}

impl Indices {
    /// 全部轴, 按图像堆栈的存储顺序排列.
    pub const ALL: [Indices; 5] = [Self::Round, Self::Ch, Self::Z, Self::Y, Self::X];

    /// 参与 tile 遍历的三个轴.
    pub const TILE_AXES: [Indices; 3] = [Self::Round, Self::Ch, Self::Z];

    /// 轴的短名称, 与实验清单中的字段名一致.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Round => "r",
            Self::Ch => "c",
            Self::Z => "z",
            Self::Y => "y",
            Self::X => "x",
        }
    }

    /// 从短名称解析. 未知名称返回 `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.name() == name)
    }

    /// 该轴在 `(ROUND, CH, Z, Y, X)` 五维堆栈中的位置.
    #[inline]
    pub const fn stack_axis(&self) -> usize {
        match self {
            Self::Round => 0,
            Self::Ch => 1,
            Self::Z => 2,
            Self::Y => 3,
            Self::X => 4,
        }
    }

    /// 是否为 tile 遍历轴 (`Round`, `Ch`, `Z`)?
    #[inline]
    pub const fn is_tile_axis(&self) -> bool {
        matches!(self, Self::Round | Self::Ch | Self::Z)
    }
}

impl Display for Indices {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 强度表中逐特征 (feature) 列的名称.
pub mod features {
    /// 特征轴名.
    pub const AXIS: &str = "features";

    /// 解码目标列.
    pub const TARGET: &str = "target";

    /// 解码质量列.
    pub const QUALITY: &str = "quality";

    /// 未匹配任何码字时的目标名.
    pub const NO_CALL: &str = "nan";
}
