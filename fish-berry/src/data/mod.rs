//! FISH 数据基础结构: 图像堆栈, 光斑属性, 强度表.

mod intensity;
mod save;
mod spot;
mod stack;
mod target;
pub mod window;

pub use intensity::IntensityTable;
pub use save::ImgWriteVis;
pub use spot::{SpotAttribute, SpotAttributes, SpotFileError};
pub use stack::{ImageStack, TileSlice};
pub use target::Target;
pub use window::IntensityWindow;

/// 两个本应对齐的轴长度不一致.
///
/// 光斑属性行数与特征数不符, 或码本轮次/通道数与强度表不符时产生.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{what} mismatch: expected {expected}, got {actual}")]
pub struct ShapeMismatchError {
    /// 不一致的是哪一对轴.
    pub what: &'static str,

    /// 期望长度.
    pub expected: usize,

    /// 实际长度.
    pub actual: usize,
}

impl ShapeMismatchError {
    /// 直接初始化.
    #[inline]
    pub const fn new(what: &'static str, expected: usize, actual: usize) -> Self {
        Self {
            what,
            expected,
            actual,
        }
    }
}
