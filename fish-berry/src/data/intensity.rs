//! 强度表: `(feature, channel, round)` 三维强度及逐特征元信息.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use std::collections::BTreeMap;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ShapeMismatchError, SpotAttribute, SpotAttributes, Target};
use crate::codebook::Codebook;
use crate::Idx3d;

/// 解码后附加到强度表上的逐特征列.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Decoded {
    targets: Vec<Target>,
    qualities: Vec<f32>,
}

/// 带标签的三维强度表, 按 `(feature, channel, round)` 组织.
///
/// 轴 0 的标签是光斑属性表, 轴 1 / 轴 2 的标签分别是通道 / 轮次编号.
/// 原始强度在构建后只读; 解码会产生一份附带目标与质量列的新表.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntensityTable {
    data: Array3<f32>,
    spots: SpotAttributes,
    channels: Vec<usize>,
    rounds: Vec<usize>,
    decoded: Option<Decoded>,
}

impl Index<Idx3d> for IntensityTable {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IntensityTable {
    /// 从 `(feature, channel, round)` 强度数组和光斑属性表构建强度表.
    ///
    /// `data.shape[0]` 必须等于 `spot_attributes.len()`, 否则返回报告两者数量的 `Err`.
    /// 成功时 `data` 原样保存, 通道和轮次标签分别为 `0..shape[1]`, `0..shape[2]`.
    pub fn from_spot_data(
        data: Array3<f32>,
        spot_attributes: SpotAttributes,
    ) -> Result<Self, ShapeMismatchError> {
        let (features, chs, rounds) = data.dim();
        if features != spot_attributes.len() {
            return Err(ShapeMismatchError::new(
                "spot attributes vs features",
                features,
                spot_attributes.len(),
            ));
        }
        Ok(Self {
            data,
            spots: spot_attributes,
            channels: (0..chs).collect(),
            rounds: (0..rounds).collect(),
            decoded: None,
        })
    }

    /// 按照码本生成确定性的合成强度表.
    ///
    /// 第 `i` 个特征表达第 `i % codebook.len()` 个码字: 每轮期望通道为 1.0, 其余为 0.0.
    /// 光斑中心为 `(0, i, i)`, 半径为 1. 码本为空时所有强度为 0.
    pub fn synthetic(codebook: &Codebook, n_spots: usize) -> Self {
        let mut data = Array3::<f32>::zeros((n_spots, codebook.num_chs(), codebook.num_rounds()));
        if !codebook.is_empty() {
            for (i, mut feature) in data.axis_iter_mut(Axis(0)).enumerate() {
                let code = codebook.code_at(i % codebook.len());
                for (round, &ch) in code.channels().iter().enumerate() {
                    feature[(ch, round)] = 1.0;
                }
            }
        }
        let spots = (0..n_spots)
            .map(|i| SpotAttribute::new(0.0, i as f64, i as f64, 1.0))
            .collect();
        // 该操作不会生成 `Err`, 可直接 unwrap.
        Self::from_spot_data(data, spots).unwrap()
    }

    /// 强度表形状 `(feature, channel, round)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 特征个数.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// 通道个数.
    #[inline]
    pub fn num_chs(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// 轮次个数.
    #[inline]
    pub fn num_rounds(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// 获得强度数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 获取第 `index` 个特征的 `(channel, round)` 强度视图.
    ///
    /// 越界时 panic.
    #[inline]
    pub fn feature(&self, index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), index)
    }

    /// 获取能按顺序迭代各特征 `(channel, round)` 强度视图的迭代器.
    #[inline]
    pub fn feature_iter(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, f32>> {
        self.data.axis_iter(Axis(0))
    }

    /// 逐特征光斑属性.
    #[inline]
    pub fn spot_attributes(&self) -> &SpotAttributes {
        &self.spots
    }

    /// 通道轴标签.
    #[inline]
    pub fn channel_labels(&self) -> &[usize] {
        &self.channels
    }

    /// 轮次轴标签.
    #[inline]
    pub fn round_labels(&self) -> &[usize] {
        &self.rounds
    }

    /// 是否已经解码?
    #[inline]
    pub fn is_decoded(&self) -> bool {
        self.decoded.is_some()
    }

    /// 解码目标列. 未解码时返回 `None`.
    #[inline]
    pub fn targets(&self) -> Option<&[Target]> {
        self.decoded.as_ref().map(|d| d.targets.as_slice())
    }

    /// 解码质量列. 未解码时返回 `None`.
    #[inline]
    pub fn qualities(&self) -> Option<&[f32]> {
        self.decoded.as_ref().map(|d| d.qualities.as_slice())
    }

    /// 复制原始数据, 并附加解码列, 生成新的强度表.
    ///
    /// 列长度必须等于特征个数, 否则程序 panic.
    pub(crate) fn with_decoding(&self, targets: Vec<Target>, qualities: Vec<f32>) -> Self {
        assert_eq!(targets.len(), self.num_features(), "目标列长度不符");
        assert_eq!(qualities.len(), self.num_features(), "质量列长度不符");
        Self {
            decoded: Some(Decoded { targets, qualities }),
            ..self.clone_raw()
        }
    }

    /// 检查特征数与光斑属性行数 (以及解码列长度) 是否一致.
    ///
    /// 由反序列化得到的强度表绕过了构造函数, 需要调用此函数重新检查.
    #[cfg(feature = "serde")]
    pub(crate) fn check_alignment(&self) -> Result<(), ShapeMismatchError> {
        let n = self.num_features();
        if self.spots.len() != n {
            return Err(ShapeMismatchError::new(
                "spot attributes vs features",
                n,
                self.spots.len(),
            ));
        }
        if let Some(d) = &self.decoded {
            if d.targets.len() != n || d.qualities.len() != n {
                return Err(ShapeMismatchError::new(
                    "decode columns vs features",
                    n,
                    d.targets.len().min(d.qualities.len()),
                ));
            }
        }
        if self.channels.len() != self.num_chs() || self.rounds.len() != self.num_rounds() {
            return Err(ShapeMismatchError::new(
                "axis labels vs data",
                self.num_chs() * self.num_rounds(),
                self.channels.len() * self.rounds.len(),
            ));
        }
        Ok(())
    }

    /// 只复制原始部分 (不含解码列).
    fn clone_raw(&self) -> Self {
        Self {
            data: self.data.clone(),
            spots: self.spots.clone(),
            channels: self.channels.clone(),
            rounds: self.rounds.clone(),
            decoded: None,
        }
    }

    /// 按 `indices` 给出的顺序挑选特征组成新表, 解码列 (若有) 一并挑选.
    ///
    /// 越界时 panic.
    pub fn select(&self, indices: &[usize]) -> Self {
        let (_, chs, rounds) = self.shape();
        let decoded = self.decoded.as_ref().map(|d| Decoded {
            targets: indices.iter().map(|&i| d.targets[i].clone()).collect(),
            qualities: indices.iter().map(|&i| d.qualities[i]).collect(),
        });
        Self {
            data: Array3::from_shape_fn((indices.len(), chs, rounds), |(i, c, r)| {
                self.data[(indices[i], c, r)]
            }),
            spots: self.spots.select(indices),
            channels: self.channels.clone(),
            rounds: self.rounds.clone(),
            decoded,
        }
    }

    /// 只保留被解码为 `target` 的特征, 其余丢弃. `target` 为 `"nan"` 时选出未匹配的特征.
    ///
    /// 未解码时返回 `None`.
    pub fn where_target(&self, target: &str) -> Option<Self> {
        let indices: Vec<usize> = self
            .targets()?
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.is(target).then_some(i))
            .collect();
        Some(self.select(&indices))
    }

    /// 统计每个目标 (含 `"nan"`) 被分配的特征个数. 未解码时返回 `None`.
    pub fn target_counts(&self) -> Option<BTreeMap<&str, usize>> {
        let mut ans = BTreeMap::new();
        for t in self.targets()? {
            *ans.entry(t.as_str()).or_insert(0) += 1;
        }
        Some(ans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::Code;

    /// 构造 `n` 个光斑属性. 第 `i` 个的 z, y, x 都为 `i`, 半径为 1.
    fn spot_attribute_factory(n: usize) -> SpotAttributes {
        (0..n)
            .map(|i| SpotAttribute::new(i as f64, i as f64, i as f64, 1.0))
            .collect()
    }

    #[test]
    fn test_from_spot_data_keeps_values() {
        let spots = spot_attribute_factory(3);
        let data = Array3::from_shape_vec((3, 5, 2), (0..30).map(|v| v as f32).collect()).unwrap();
        let intensities = IntensityTable::from_spot_data(data.clone(), spots).unwrap();

        assert_eq!(intensities.shape(), (3, 5, 2));
        assert_eq!(intensities.data(), data.view());
        assert_eq!(intensities.channel_labels(), &[0, 1, 2, 3, 4]);
        assert_eq!(intensities.round_labels(), &[0, 1]);
        assert_eq!(intensities[(2, 4, 1)], 29.0);
        assert!(!intensities.is_decoded());
        assert!(intensities.targets().is_none());
    }

    #[test]
    fn test_from_spot_data_zeros() {
        let data = Array3::<f32>::zeros((3, 5, 2));
        let intensities =
            IntensityTable::from_spot_data(data.clone(), spot_attribute_factory(3)).unwrap();
        assert_eq!(intensities.shape(), data.dim());
        assert_eq!(intensities.data(), data.view());
    }

    #[test]
    fn test_from_spot_data_misaligned() {
        let data = Array3::<f32>::zeros((3, 5, 2));
        let err = IntensityTable::from_spot_data(data, spot_attribute_factory(2)).unwrap_err();
        assert_eq!(err.expected, 3);
        assert_eq!(err.actual, 2);
        assert!(err.to_string().contains('3'));
    }

    fn decoded_table() -> IntensityTable {
        let data = Array3::from_shape_fn((4, 2, 2), |(f, c, r)| (f * 4 + c * 2 + r) as f32);
        let table = IntensityTable::from_spot_data(data, spot_attribute_factory(4)).unwrap();
        let targets = vec![
            Target::Named("A".into()),
            Target::NoCall,
            Target::Named("B".into()),
            Target::Named("A".into()),
        ];
        table.with_decoding(targets, vec![0.9, 0.5, 0.7, 0.8])
    }

    #[test]
    fn test_where_target() {
        let table = decoded_table();
        let a = table.where_target("A").unwrap();
        assert_eq!(a.num_features(), 2);
        assert_eq!(a.feature(0), table.feature(0));
        assert_eq!(a.feature(1), table.feature(3));
        assert_eq!(a.spot_attributes()[1].z, 3.0);
        assert_eq!(a.qualities().unwrap(), &[0.9, 0.8]);

        let none = table.where_target("C").unwrap();
        assert_eq!(none.num_features(), 0);
        assert_eq!(none.shape(), (0, 2, 2));

        let raw =
            IntensityTable::from_spot_data(Array3::zeros((1, 1, 1)), spot_attribute_factory(1))
                .unwrap();
        assert!(raw.where_target("A").is_none());
    }

    #[test]
    fn test_where_target_selects_no_calls() {
        let table = decoded_table();
        let nan = table.where_target("nan").unwrap();
        assert_eq!(nan.num_features(), 1);
        assert_eq!(nan.feature(0), table.feature(1));
        assert_eq!(nan.targets().unwrap(), &[Target::NoCall]);
        assert_eq!(
            nan.num_features(),
            table.target_counts().unwrap()["nan"]
        );
    }

    #[test]
    fn test_target_counts() {
        let table = decoded_table();
        let counts = table.target_counts().unwrap();
        assert_eq!(counts["A"], 2);
        assert_eq!(counts["B"], 1);
        assert_eq!(counts["nan"], 1);
    }

    #[test]
    fn test_synthetic_expresses_codes() {
        let codebook = Codebook::new(
            2,
            3,
            vec![Code::new("A", vec![0, 2]), Code::new("B", vec![1, 1])],
        )
        .unwrap();
        let table = IntensityTable::synthetic(&codebook, 3);
        assert_eq!(table.shape(), (3, 3, 2));
        assert_eq!(table[(0, 0, 0)], 1.0);
        assert_eq!(table[(0, 2, 1)], 1.0);
        assert_eq!(table[(1, 1, 0)], 1.0);
        assert_eq!(table[(2, 0, 0)], 1.0);
        assert_eq!(table.feature(0).sum(), 2.0);
    }
}
