//! "逐轮最大通道" 解码.
//!
//! 对每个特征, 在每一轮中选出强度最大的通道, 得到长度为轮次数的观测码字,
//! 再与码本逐一比对. 完全一致则分配该目标, 否则记为未匹配.

use ndarray::{ArrayView1, ArrayView2, Axis};

use super::{check_alignment, log_summary, DecodeResult, DecoderAlgorithm};
use crate::codebook::Codebook;
use crate::data::{IntensityTable, Target};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::parallel::prelude::*;
    }
}

/// 求一轮中强度最大的通道及其强度.
///
/// 平局时选择编号最小的通道. NaN 永远不会被选中, `+inf` 视为最大值 (饱和通道).
/// 若整轮都是 NaN, 则返回 `(0, f32::NEG_INFINITY)`.
pub fn argmax_channel(values: ArrayView1<f32>) -> (usize, f32) {
    let mut best: Option<(usize, f32)> = None;
    for (ch, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        // 严格大于: 相等时保留更小的通道.
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((ch, v));
        }
    }
    best.unwrap_or((0, f32::NEG_INFINITY))
}

/// 一轮的 "尖锐程度": `peak / Σ(该轮所有正有限值)`.
///
/// 取值范围 `[0, 1]`. 只有 `peak` 一个非零通道时为 1; 各通道强度相同时为 `1 / 通道数`.
/// `peak` 为 `+inf` 时为 1. 和为 0 (全零或全负) 时为 0.
pub fn round_peakedness(values: ArrayView1<f32>, peak: f32) -> f32 {
    if peak == f32::INFINITY {
        return 1.0;
    }
    let sum: f32 = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .sum();
    if sum > 0.0 && peak.is_finite() && peak > 0.0 {
        peak / sum
    } else {
        0.0
    }
}

/// 逐轮最大通道解码器.
///
/// 质量分数为各轮 [`round_peakedness`] 的平均值. 未匹配的特征同样报告质量分数.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PerRoundMaxChannel;

impl PerRoundMaxChannel {
    /// 算法名.
    pub const NAME: &'static str = "PerRoundMaxChannel";

    /// 初始化. 该解码器没有参数.
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// 解码单个 `(channel, round)` 特征.
    fn decode_feature(feature: ArrayView2<f32>, codebook: &Codebook) -> (Target, f32) {
        let rounds = feature.len_of(Axis(1));
        let mut pattern = Vec::with_capacity(rounds);
        let mut quality = 0.0f32;
        for column in feature.axis_iter(Axis(1)) {
            let (ch, peak) = argmax_channel(column.view());
            pattern.push(ch);
            quality += round_peakedness(column, peak);
        }
        if rounds != 0 {
            quality /= rounds as f32;
        }
        let target = match codebook.find_exact(&pattern) {
            Some(code) => Target::Named(code.target().to_owned()),
            None => Target::NoCall,
        };
        (target, quality)
    }
}

impl DecoderAlgorithm for PerRoundMaxChannel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(
        &self,
        intensities: &IntensityTable,
        codebook: &Codebook,
    ) -> DecodeResult<IntensityTable> {
        check_alignment(intensities, codebook)?;
        let (targets, qualities): (Vec<Target>, Vec<f32>) = intensities
            .feature_iter()
            .map(|f| Self::decode_feature(f, codebook))
            .unzip();
        let decoded = intensities.with_decoding(targets, qualities);
        log_summary(Self::NAME, &decoded);
        Ok(decoded)
    }

    #[cfg(feature = "rayon")]
    fn run_parallel(
        &self,
        intensities: &IntensityTable,
        codebook: &Codebook,
    ) -> DecodeResult<IntensityTable> {
        self.par_run(intensities, codebook)
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl PerRoundMaxChannel {
    /// 借助 `rayon`, 并行地解码各特征. 结果与 [`DecoderAlgorithm::run`] 完全一致.
    pub fn par_run(
        &self,
        intensities: &IntensityTable,
        codebook: &Codebook,
    ) -> DecodeResult<IntensityTable> {
        check_alignment(intensities, codebook)?;
        let decoded: Vec<(Target, f32)> = intensities
            .data()
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|f| Self::decode_feature(f, codebook))
            .collect();
        let (targets, qualities) = decoded.into_iter().unzip();
        let decoded = intensities.with_decoding(targets, qualities);
        log_summary(Self::NAME, &decoded);
        Ok(decoded)
    }
}
