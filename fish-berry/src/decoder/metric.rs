//! 度量距离解码: L2 归一化后的最近码字.

use ndarray::{Array2, ArrayView2, Axis};
use ordered_float::OrderedFloat;
use std::f32::consts::SQRT_2;

use super::{check_alignment, log_summary, DecodeResult, DecoderAlgorithm};
use crate::codebook::Codebook;
use crate::data::{IntensityTable, Target};

/// 度量距离解码器.
///
/// 把每个特征的 `(channel, round)` 强度和每个码字的独热数组都展平并做 L2 归一化,
/// 取欧氏距离最近的码字 (距离相同时取靠前的码字). 当距离不超过 `max_distance`
/// 且原始强度的 L2 范数不小于 `min_intensity` 时分配该目标, 否则记为未匹配.
///
/// 质量分数为 `1 - distance / sqrt(2)`, 截断到 `[0, 1]`.
/// 两个非负单位向量的距离不超过 `sqrt(2)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MetricDistance {
    /// 允许的最大归一化距离.
    pub max_distance: f32,

    /// 允许的最小原始强度 L2 范数.
    pub min_intensity: f32,
}

impl MetricDistance {
    /// 算法名.
    pub const NAME: &'static str = "MetricDistance";

    /// 默认最大距离.
    pub const DEFAULT_MAX_DISTANCE: f32 = 0.5;

    /// 默认最小强度.
    pub const DEFAULT_MIN_INTENSITY: f32 = 0.0;

    /// 初始化.
    #[inline]
    pub const fn new(max_distance: f32, min_intensity: f32) -> Self {
        Self {
            max_distance,
            min_intensity,
        }
    }

    /// 码本独热数组展平为 `(target, channel * round)` 并归一化.
    fn normalized_codes(codebook: &Codebook) -> Array2<f32> {
        let codes = codebook.code_array();
        let (n, chs, rounds) = codes.dim();
        // `code_array` 总是标准布局, 该操作不会生成 `Err`, 可直接 unwrap.
        let mut flat = codes.into_shape((n, chs * rounds)).unwrap();
        // 每个码字每轮恰好一个 1.
        flat /= (rounds as f32).sqrt();
        flat
    }

    /// 返回最近码字位置 (若被接受) 与质量分数.
    fn decode_feature(
        &self,
        feature: ArrayView2<f32>,
        codes: &Array2<f32>,
    ) -> (Option<usize>, f32) {
        let values: Vec<f32> = feature
            .iter()
            .map(|&v| if v.is_finite() { v } else { 0.0 })
            .collect();
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return (None, 0.0);
        }

        let nearest = codes
            .axis_iter(Axis(0))
            .map(|code| {
                code.iter()
                    .zip(values.iter())
                    .map(|(c, v)| (v / norm - c).powi(2))
                    .sum::<f32>()
                    .sqrt()
            })
            .enumerate()
            .min_by_key(|&(_, d)| OrderedFloat(d));

        let Some((index, distance)) = nearest else {
            return (None, 0.0);
        };
        let quality = (1.0 - distance / SQRT_2).clamp(0.0, 1.0);
        let accepted = distance <= self.max_distance && norm >= self.min_intensity;
        (accepted.then_some(index), quality)
    }
}

impl Default for MetricDistance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DISTANCE, Self::DEFAULT_MIN_INTENSITY)
    }
}

impl DecoderAlgorithm for MetricDistance {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(
        &self,
        intensities: &IntensityTable,
        codebook: &Codebook,
    ) -> DecodeResult<IntensityTable> {
        check_alignment(intensities, codebook)?;
        let codes = Self::normalized_codes(codebook);
        let (targets, qualities): (Vec<Target>, Vec<f32>) = intensities
            .feature_iter()
            .map(|f| {
                let (index, quality) = self.decode_feature(f, &codes);
                let target = match index {
                    Some(i) => Target::Named(codebook.code_at(i).target().to_owned()),
                    None => Target::NoCall,
                };
                (target, quality)
            })
            .unzip();
        let decoded = intensities.with_decoding(targets, qualities);
        log_summary(Self::NAME, &decoded);
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::Code;
    use crate::data::{SpotAttribute, SpotAttributes};
    use ndarray::Array3;

    fn codebook() -> Codebook {
        Codebook::new(
            2,
            2,
            vec![Code::new("ACTB", vec![0, 1]), Code::new("GAPDH", vec![1, 0])],
        )
        .unwrap()
    }

    /// 每个特征为 `[[ch0 r0, ch0 r1], [ch1 r0, ch1 r1]]`.
    fn table(features: Vec<[[f32; 2]; 2]>) -> IntensityTable {
        let n = features.len();
        let flat: Vec<f32> = features.into_iter().flatten().flatten().collect();
        let data = Array3::from_shape_vec((n, 2, 2), flat).unwrap();
        let spots: SpotAttributes = (0..n)
            .map(|i| SpotAttribute::new(0.0, i as f64, i as f64, 1.0))
            .collect();
        IntensityTable::from_spot_data(data, spots).unwrap()
    }

    #[test]
    fn test_exact_code_has_full_quality() {
        let t = table(vec![[[1.0, 0.0], [0.0, 1.0]], [[0.0, 3.0], [3.0, 0.0]]]);
        let d = MetricDistance::default().run(&t, &codebook()).unwrap();
        assert_eq!(d.targets().unwrap()[0], Target::Named("ACTB".into()));
        assert_eq!(d.targets().unwrap()[1], Target::Named("GAPDH".into()));
        for &q in d.qualities().unwrap() {
            assert!((q - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_max_distance_threshold() {
        // 最近码字为 ACTB, 归一化距离约为 0.85.
        let t = table(vec![[[0.9, 0.8], [0.1, 0.2]]]);
        let strict = MetricDistance::default().run(&t, &codebook()).unwrap();
        assert_eq!(strict.targets().unwrap()[0], Target::NoCall);

        let loose = MetricDistance::new(1.0, 0.0).run(&t, &codebook()).unwrap();
        assert_eq!(loose.targets().unwrap()[0], Target::Named("ACTB".into()));
        assert_eq!(strict.qualities(), loose.qualities());
        let q = loose.qualities().unwrap()[0];
        assert!(q > 0.0 && q < 1.0);
    }

    #[test]
    fn test_min_intensity_threshold() {
        let t = table(vec![[[0.1, 0.0], [0.0, 0.1]]]);
        let weak = MetricDistance::new(0.5, 0.5).run(&t, &codebook()).unwrap();
        assert_eq!(weak.targets().unwrap()[0], Target::NoCall);

        let d = MetricDistance::default().run(&t, &codebook()).unwrap();
        assert_eq!(d.targets().unwrap()[0], Target::Named("ACTB".into()));
    }

    #[test]
    fn test_zero_and_nan_features() {
        let t = table(vec![[[0.0, 0.0], [0.0, 0.0]], [[f32::NAN, 0.0], [0.0, 0.0]]]);
        let d = MetricDistance::default().run(&t, &codebook()).unwrap();
        assert!(d.targets().unwrap().iter().all(Target::is_no_call));
        assert_eq!(d.qualities().unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let cb = Codebook::new(2, 3, vec![Code::new("A", vec![0, 2])]).unwrap();
        let t = table(vec![[[1.0, 0.0], [0.0, 1.0]]]);
        assert!(MetricDistance::default().run(&t, &cb).is_err());
    }

    #[test]
    fn test_parallel_falls_back_to_run() {
        let t = table(vec![[[1.0, 0.0], [0.0, 1.0]], [[0.9, 0.8], [0.1, 0.2]]]);
        let d = MetricDistance::default();
        assert_eq!(
            d.run_parallel(&t, &codebook()).unwrap(),
            d.run(&t, &codebook()).unwrap()
        );
    }

    #[test]
    fn test_empty_codebook() {
        let cb = Codebook::new(2, 2, vec![]).unwrap();
        let t = table(vec![[[1.0, 0.0], [0.0, 1.0]]]);
        let d = MetricDistance::default().run(&t, &cb).unwrap();
        assert_eq!(d.targets().unwrap()[0], Target::NoCall);
    }
}
