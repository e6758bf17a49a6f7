//! 光斑 (特征) 的空间属性表.

use ndarray::{Array2, ArrayView2};
use ndarray_npy::{read_npy, ReadNpyError};
use std::ops::Index;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ShapeMismatchError;

/// 单个光斑的空间属性: 中心 `(z, y, x)` 与半径.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpotAttribute {
    /// 中心 z 坐标.
    pub z: f64,

    /// 中心 y 坐标.
    pub y: f64,

    /// 中心 x 坐标.
    pub x: f64,

    /// 光斑半径.
    pub radius: f64,
}

impl SpotAttribute {
    /// 直接初始化.
    #[inline]
    pub const fn new(z: f64, y: f64, x: f64, radius: f64) -> Self {
        Self { z, y, x, radius }
    }
}

/// 光斑属性表, 每行对应一个特征.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpotAttributes(Vec<SpotAttribute>);

impl SpotAttributes {
    /// 列数: `[z, y, x, radius]`.
    pub const COLUMNS: usize = 4;

    /// 从逐行属性创建.
    #[inline]
    pub fn new(rows: Vec<SpotAttribute>) -> Self {
        Self(rows)
    }

    /// 从 `(n, 4)` 数组创建, 列依次为 `z, y, x, radius`.
    ///
    /// 列数不为 4 时返回 `Err`.
    pub fn from_array(data: ArrayView2<f64>) -> Result<Self, ShapeMismatchError> {
        let cols = data.ncols();
        if cols != Self::COLUMNS {
            return Err(ShapeMismatchError::new(
                "spot attribute columns",
                Self::COLUMNS,
                cols,
            ));
        }
        Ok(Self(
            data.rows()
                .into_iter()
                .map(|r| SpotAttribute::new(r[0], r[1], r[2], r[3]))
                .collect(),
        ))
    }

    /// 从 `(n, 4)` 的 `.npy` 文件加载.
    pub fn open_npy<P: AsRef<Path>>(path: P) -> Result<Self, SpotFileError> {
        let data: Array2<f64> = read_npy(path.as_ref())?;
        Ok(Self::from_array(data.view())?)
    }

    /// 行数, 即特征个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空表?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 获取第 `index` 行. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&SpotAttribute> {
        self.0.get(index)
    }

    /// 按特征顺序迭代各行.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, SpotAttribute> {
        self.0.iter()
    }

    /// 按 `indices` 给出的顺序挑选若干行组成新表.
    ///
    /// 越界时 panic.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self(indices.iter().map(|&i| self.0[i]).collect())
    }

    /// 转换为 `(n, 4)` 数组.
    pub fn to_array(&self) -> Array2<f64> {
        let mut ans = Array2::zeros((self.len(), Self::COLUMNS));
        for (mut row, s) in ans.rows_mut().into_iter().zip(self.0.iter()) {
            row[0] = s.z;
            row[1] = s.y;
            row[2] = s.x;
            row[3] = s.radius;
        }
        ans
    }
}

impl Index<usize> for SpotAttributes {
    type Output = SpotAttribute;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<SpotAttribute> for SpotAttributes {
    fn from_iter<T: IntoIterator<Item = SpotAttribute>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 从文件加载光斑属性的错误.
#[derive(Debug, thiserror::Error)]
pub enum SpotFileError {
    /// 读取 `.npy` 失败.
    #[error("failed to read spot attributes: {0}")]
    Npy(#[from] ReadNpyError),

    /// 列数不符.
    #[error(transparent)]
    Shape(#[from] ShapeMismatchError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_array_columns() {
        let data = array![[0.0, 1.0, 2.0, 1.5], [3.0, 4.0, 5.0, 2.0]];
        let spots = SpotAttributes::from_array(data.view()).unwrap();
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[1], SpotAttribute::new(3.0, 4.0, 5.0, 2.0));
        assert_eq!(spots.to_array(), data);
    }

    #[test]
    fn test_from_array_wrong_columns() {
        let data = Array2::<f64>::zeros((3, 3));
        let err = SpotAttributes::from_array(data.view()).unwrap_err();
        assert_eq!(err.expected, 4);
        assert_eq!(err.actual, 3);
    }

    #[test]
    fn test_select() {
        let spots: SpotAttributes = (0..4)
            .map(|i| SpotAttribute::new(i as f64, 0.0, 0.0, 1.0))
            .collect();
        let picked = spots.select(&[3, 1]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].z, 3.0);
        assert_eq!(picked[1].z, 1.0);
    }
}
