//! 可视化辅助: 按目标整理强度轨迹 (trace), 供质检散点图使用.
//!
//! 轨迹位置把 `(channel, round)` 堆叠为一维, 通道为慢变维, 轮次为快变维.
//! 例如 2 通道 x 3 轮时, 位置依次为
//! `ch=0, round=0`, `ch=0, round=1`, `ch=0, round=2`, `ch=1, round=0`, ...

mod figure;

use itertools::izip;
use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::consts::Indices;
use crate::data::IntensityTable;
use crate::traversal::ordered_iterator;

/// 可视化错误.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlotError {
    /// 强度表尚未解码, 无法按目标筛选.
    #[error("intensity table has not been decoded")]
    NotDecoded,
}

/// 一个轨迹位置: 由哪个通道和轮次堆叠而来.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracePosition {
    /// 通道编号.
    pub ch: usize,

    /// 轮次编号.
    pub round: usize,
}

impl TracePosition {
    /// 坐标轴标签, 形如 `"ch=1, round=0"`.
    pub fn label(&self) -> String {
        format!("ch={}, round={}", self.ch, self.round)
    }
}

/// 被解码为同一目标的全部特征的强度轨迹.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetTraces {
    target: String,
    positions: Vec<TracePosition>,
    /// `(feature, position)`.
    traces: Array2<f32>,
    jitter: f32,
}

/// 按目标整理强度轨迹.
///
/// 只保留被解码为 `target` 的特征. 没有任何特征匹配时得到一个特征数为 0 的结果,
/// 位置仍按通道数与轮次数给出. 强度表未解码时返回 [`PlotError::NotDecoded`].
pub fn intensities_by_target(
    intensities: &IntensityTable,
    target: &str,
) -> Result<TargetTraces, PlotError> {
    let selected = intensities
        .where_target(target)
        .ok_or(PlotError::NotDecoded)?;
    let dims = [
        (Indices::Ch, selected.num_chs()),
        (Indices::Round, selected.num_rounds()),
    ];
    let positions: Vec<TracePosition> = ordered_iterator(dims)
        .map(|coord| TracePosition {
            ch: coord[Indices::Ch],
            round: coord[Indices::Round],
        })
        .collect();
    let traces = Array2::from_shape_fn((selected.num_features(), positions.len()), |(f, p)| {
        let pos = &positions[p];
        selected[(f, pos.ch, pos.round)]
    });
    log::debug!(
        "{} features assigned to `{target}`, {} trace positions",
        traces.nrows(),
        positions.len()
    );
    Ok(TargetTraces {
        target: target.to_owned(),
        positions,
        traces,
        jitter: 0.0,
    })
}

impl TargetTraces {
    /// 目标名.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 特征个数.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.traces.nrows()
    }

    /// 轨迹位置, 长度为 `通道数 * 轮次数`.
    #[inline]
    pub fn positions(&self) -> &[TracePosition] {
        &self.positions
    }

    /// 全部位置的坐标轴标签.
    pub fn labels(&self) -> Vec<String> {
        self.positions.iter().map(TracePosition::label).collect()
    }

    /// `(feature, position)` 强度矩阵.
    #[inline]
    pub fn traces(&self) -> ArrayView2<'_, f32> {
        self.traces.view()
    }

    /// 第 `index` 个特征的轨迹. 越界时 panic.
    #[inline]
    pub fn trace(&self, index: usize) -> ArrayView1<'_, f32> {
        self.traces.row(index)
    }

    /// 为散点图的横坐标加入抖动, 使同一位置上的特征彼此错开.
    ///
    /// 抖动是确定性的: 第 `i` 个特征 (共 `n` 个) 的偏移为在
    /// `[-width / 2, width / 2]` 上均匀排布的第 `i` 个点. 只有一个特征时偏移为 0.
    /// 非有限或负的 `width` 视为 0.
    pub fn with_jitter(mut self, width: f32) -> Self {
        self.jitter = if width.is_finite() && width > 0.0 {
            width
        } else {
            0.0
        };
        self
    }

    /// 当前抖动宽度.
    #[inline]
    pub fn jitter(&self) -> f32 {
        self.jitter
    }

    /// 第 `feature` 个特征的横坐标偏移.
    fn offset(&self, feature: usize) -> f32 {
        let n = self.num_features();
        if n <= 1 || self.jitter == 0.0 {
            return 0.0;
        }
        self.jitter * (feature as f32 / (n - 1) as f32 - 0.5)
    }

    /// 散点 `(x, y)`: `x` 为位置编号加抖动偏移, `y` 为强度.
    ///
    /// 按特征优先的顺序排列, 每个特征贡献 `positions().len()` 个点.
    pub fn points(&self) -> Vec<(f32, f32)> {
        let mut ans = Vec::with_capacity(self.traces.len());
        for (f, row) in self.traces.rows().into_iter().enumerate() {
            let offset = self.offset(f);
            for (p, &y) in izip!(0.., row.iter()) {
                ans.push((p as f32 + offset, y));
            }
        }
        ans
    }
}
