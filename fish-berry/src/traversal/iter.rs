use super::Coordinate;
use crate::consts::Indices;
use std::iter::FusedIterator;

/// 多维有序遍历迭代器.
///
/// 以 "里程表" 方式推进: 每个维度是一位数字, 第一个维度是最高位,
/// 最后一个维度是最低位. 最低位自增, 溢出时归零并向高位进位.
/// 迭代深度只与维度个数有关, 不使用递归.
///
/// 等价的嵌套循环写法 (以三个维度为例):
///
/// ```
/// let (r, c, z) = (2, 3, 4);
/// let mut v = vec![];
/// for i in 0..r {
///     for j in 0..c {
///         for k in 0..z {
///             v.push((i, j, k));
///         }
///     }
/// }
/// assert_eq!(v.len(), 24);
/// ```
#[derive(Clone, Debug)]
pub struct OrderedIter {
    dims: Vec<(Indices, usize)>,
    digits: Vec<usize>,
    remaining: usize,
}

impl OrderedIter {
    /// 从 (维度, 大小) 序列初始化.
    ///
    /// 任一维度大小为 0 时空间为空. 否则若所有维度大小的乘积超出 `usize`, 则程序 panic.
    pub fn new(dims: Vec<(Indices, usize)>) -> Self {
        let remaining = if dims.iter().any(|&(_, size)| size == 0) {
            0
        } else {
            dims.iter()
                .try_fold(1usize, |acc, (_, size)| acc.checked_mul(*size))
                .expect("遍历空间大小超出 usize 范围")
        };
        Self {
            digits: vec![0; dims.len()],
            dims,
            remaining,
        }
    }

    /// 参与遍历的 (维度, 大小) 序列.
    #[inline]
    pub fn dimension_sizes(&self) -> &[(Indices, usize)] {
        &self.dims
    }

    /// 最低位自增并逐位进位.
    fn advance(&mut self) {
        for (digit, (_, size)) in self.digits.iter_mut().zip(self.dims.iter()).rev() {
            *digit += 1;
            if *digit < *size {
                return;
            }
            *digit = 0;
        }
    }
}

impl Iterator for OrderedIter {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let ret = self
            .dims
            .iter()
            .zip(self.digits.iter())
            .map(|((dim, _), v)| (*dim, *v))
            .collect();
        self.remaining -= 1;
        if self.remaining != 0 {
            self.advance();
        }
        Some(ret)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for OrderedIter {}

impl FusedIterator for OrderedIter {}
