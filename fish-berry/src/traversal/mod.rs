//! 多维有序遍历.
//!
//! 给定一串具名维度及其大小, 按照 "慢变 -> 快变" 的顺序枚举空间中的所有坐标.
//! 序列中第一个维度变化最慢, 最后一个维度变化最快, 等价于以最后一个维度为最内层的嵌套循环.
//!
//! ```
//! use fish_berry::consts::Indices;
//! use fish_berry::traversal::{join_dimension_sizes, ordered_iterator};
//!
//! let sizes = join_dimension_sizes([Indices::Round, Indices::Ch], 2, 3, 1).unwrap();
//! let coords: Vec<_> = ordered_iterator(sizes).collect();
//! assert_eq!(coords.len(), 6);
//! assert_eq!(coords[1][Indices::Ch], 1);
//! assert_eq!(coords[3][Indices::Round], 1);
//! ```

mod coordinate;
mod iter;

pub use coordinate::Coordinate;
pub use iter::OrderedIter;

use crate::consts::Indices;

/// 遍历请求的构造错误.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TraversalError {
    /// 维度不属于 `{ROUND, CH, Z}`, 无法查到其大小.
    #[error("unknown traversal dimension `{0}`, expected one of r, c, z")]
    UnknownDimension(Indices),

    /// 同一维度在序列中出现了不止一次.
    #[error("dimension `{0}` appears more than once in the traversal order")]
    DuplicateDimension(Indices),
}

/// 遍历运行时结果.
pub type TraversalResult<T> = Result<T, TraversalError>;

/// 将维度序列与各自的大小配对, 保持输入顺序.
///
/// 例如 `dimension_sequence` 为 `(ROUND, CH, Z)` 且三者大小均为 2 时,
/// 返回 `[(ROUND, 2), (CH, 2), (Z, 2)]`.
///
/// 序列中出现 `Y` 或 `X` 时返回 [`TraversalError::UnknownDimension`];
/// 重复的维度返回 [`TraversalError::DuplicateDimension`].
pub fn join_dimension_sizes<I: IntoIterator<Item = Indices>>(
    dimension_sequence: I,
    size_for_round: usize,
    size_for_ch: usize,
    size_for_z: usize,
) -> TraversalResult<Vec<(Indices, usize)>> {
    let mut ans: Vec<(Indices, usize)> = Vec::with_capacity(3);
    for dimension in dimension_sequence {
        let size = match dimension {
            Indices::Round => size_for_round,
            Indices::Ch => size_for_ch,
            Indices::Z => size_for_z,
            unknown => return Err(TraversalError::UnknownDimension(unknown)),
        };
        if ans.iter().any(|(d, _)| *d == dimension) {
            return Err(TraversalError::DuplicateDimension(dimension));
        }
        ans.push((dimension, size));
    }
    Ok(ans)
}

/// 获取遍历 `dimension_sizes` 所张成空间中全部坐标的惰性迭代器.
///
/// 序列按最慢变化维度到最快变化维度排列. 每次产出的 [`Coordinate`] 都是独立的快照.
///
/// 1. 空序列只产出一个空坐标.
/// 2. 任一维度大小为 0 时不产出任何坐标.
///
/// 再次以相同输入调用会得到完全相同的序列.
#[inline]
pub fn ordered_iterator<I>(dimension_sizes: I) -> OrderedIter
where
    I: IntoIterator<Item = (Indices, usize)>,
{
    OrderedIter::new(dimension_sizes.into_iter().collect())
}
