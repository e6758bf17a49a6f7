//! 五维图像堆栈 `(round, ch, z, y, x)` 及其二维 tile 视图.

use ndarray::iter::{IndexedIter, Iter};
use ndarray::{Array5, ArrayView2, ArrayView5, Axis, Ix2};
use ndarray_npy::{read_npy, ReadNpyError};
use std::ops::Index;
use std::path::Path;

use crate::consts::Indices;
use crate::traversal::{self, Coordinate, TraversalError, TraversalResult};
use crate::Idx2d;

/// 已完全载入内存的多轮多通道图像堆栈, 按 `(round, ch, z, y, x)` 组织.
#[derive(Clone, Debug)]
pub struct ImageStack {
    data: Array5<f32>,
}

impl ImageStack {
    /// 直接包装 `(round, ch, z, y, x)` 数组.
    #[inline]
    pub fn from_array(data: Array5<f32>) -> Self {
        Self { data }
    }

    /// 从 `(round, ch, z, y, x)` 格式的 `.npy` 文件加载.
    pub fn open_npy<P: AsRef<Path>>(path: P) -> Result<Self, ReadNpyError> {
        let data: Array5<f32> = read_npy(path.as_ref())?;
        log::debug!("loaded image stack {:?} from {}", data.shape(), path.as_ref().display());
        Ok(Self { data })
    }

    /// 堆栈形状 `[round, ch, z, y, x]`.
    #[inline]
    pub fn shape(&self) -> [usize; 5] {
        let (r, c, z, y, x) = self.data.dim();
        [r, c, z, y, x]
    }

    /// 维度 `dim` 的长度.
    #[inline]
    pub fn size_of(&self, dim: Indices) -> usize {
        self.data.len_of(Axis(dim.stack_axis()))
    }

    /// 轮次个数.
    #[inline]
    pub fn num_rounds(&self) -> usize {
        self.size_of(Indices::Round)
    }

    /// 通道个数.
    #[inline]
    pub fn num_chs(&self) -> usize {
        self.size_of(Indices::Ch)
    }

    /// z 层个数.
    #[inline]
    pub fn num_zlayers(&self) -> usize {
        self.size_of(Indices::Z)
    }

    /// 单个 tile 的分辨率 (y, x).
    #[inline]
    pub fn tile_shape(&self) -> Idx2d {
        (self.size_of(Indices::Y), self.size_of(Indices::X))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView5<'_, f32> {
        self.data.view()
    }

    /// 获取 `(round, ch, z)` 处的二维 tile. 越界时返回 `None`.
    pub fn tile(&self, round: usize, ch: usize, z: usize) -> Option<TileSlice<'_>> {
        if round >= self.num_rounds() || ch >= self.num_chs() || z >= self.num_zlayers() {
            return None;
        }
        let view = self
            .data
            .index_axis(Axis(0), round)
            .index_axis_move(Axis(0), ch)
            .index_axis_move(Axis(0), z);
        Some(TileSlice::new(view))
    }

    /// 获取坐标 `coord` 处的二维 tile. 坐标中缺失的维度视为 0. 越界时返回 `None`.
    #[inline]
    pub fn tile_at(&self, coord: &Coordinate) -> Option<TileSlice<'_>> {
        let at = |dim| coord.get(dim).unwrap_or(0);
        self.tile(at(Indices::Round), at(Indices::Ch), at(Indices::Z))
    }

    /// 按 `order` 给定的 "慢变 -> 快变" 顺序遍历全部 tile.
    ///
    /// `order` 中未出现的 tile 维度按 `(ROUND, CH, Z)` 的顺序追加到最快变化的一端,
    /// 因此每个坐标总是完整的. `order` 含 `Y`, `X` 或重复维度时返回 `Err`.
    pub fn tiles<I: IntoIterator<Item = Indices>>(
        &self,
        order: I,
    ) -> TraversalResult<impl Iterator<Item = (Coordinate, TileSlice<'_>)>> {
        let mut order: Vec<Indices> = order.into_iter().collect();
        if let Some(&bad) = order.iter().find(|d| !d.is_tile_axis()) {
            return Err(TraversalError::UnknownDimension(bad));
        }
        for dim in Indices::TILE_AXES {
            if !order.contains(&dim) {
                order.push(dim);
            }
        }
        let sizes = traversal::join_dimension_sizes(
            order,
            self.num_rounds(),
            self.num_chs(),
            self.num_zlayers(),
        )?;
        Ok(traversal::ordered_iterator(sizes)
            .filter_map(move |coord| self.tile_at(&coord).map(|tile| (coord, tile))))
    }

    /// 沿 tile 维度 `dim` 做最大值投影, 投影后该维度长度为 1.
    /// 若该维度长度为 0, 则原样返回一份拷贝.
    ///
    /// `dim` 为 `Y` 或 `X` 时返回 `Err`.
    pub fn max_project(&self, dim: Indices) -> TraversalResult<ImageStack> {
        if !dim.is_tile_axis() {
            return Err(TraversalError::UnknownDimension(dim));
        }
        let axis = Axis(dim.stack_axis());
        if self.data.len_of(axis) == 0 {
            return Ok(self.clone());
        }
        let data = self
            .data
            .fold_axis(axis, f32::NEG_INFINITY, |acc, v| acc.max(*v))
            .insert_axis(axis);
        Ok(Self { data })
    }
}

/// 不可变、借用的二维 tile `(y, x)`.
pub struct TileSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`ImageStack`].
    data: ArrayView2<'a, f32>,
}

impl Index<Idx2d> for TileSlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> TileSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 获得 **底层** 数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<'a, f32> {
        self.data.clone()
    }

    /// 图像的分辨率 (y, x).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获取给定位置 (y, x) 的强度. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 获取带索引的像素迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> IndexedIter<'_, f32, Ix2> {
        self.data.indexed_iter()
    }
}
