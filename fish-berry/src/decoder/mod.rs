//! 码本解码.
//!
//! 解码器读取强度表与码本, 为每个特征分配目标名和质量分数,
//! 返回附带解码列的新强度表. 输入强度表不会被修改.

mod metric;
mod per_round_max;

pub use metric::MetricDistance;
pub use per_round_max::{argmax_channel, round_peakedness, PerRoundMaxChannel};

use crate::codebook::Codebook;
use crate::data::{IntensityTable, ShapeMismatchError};

/// 解码错误.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// 码本与强度表的轮次或通道数不一致.
    #[error("codebook does not fit the intensity table: {0}")]
    ShapeMismatch(#[from] ShapeMismatchError),
}

/// 解码结果.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// 解码算法.
///
/// 实现必须是确定性的: 相同输入总是得到相同的目标列和质量列.
pub trait DecoderAlgorithm: Send + Sync {
    /// 算法名, 同时用作命令行子命令的显示名.
    fn name(&self) -> &'static str;

    /// 用 `codebook` 解码 `intensities`.
    fn run(&self, intensities: &IntensityTable, codebook: &Codebook)
        -> DecodeResult<IntensityTable>;

    /// 在当前 `rayon` 线程池中并行解码. 结果必须与 [`DecoderAlgorithm::run`] 一致.
    ///
    /// 默认实现直接调用 `run`.
    fn run_parallel(
        &self,
        intensities: &IntensityTable,
        codebook: &Codebook,
    ) -> DecodeResult<IntensityTable> {
        self.run(intensities, codebook)
    }
}

/// 在比较任何码字之前, 检查码本与强度表的轮次数和通道数.
pub(crate) fn check_alignment(
    intensities: &IntensityTable,
    codebook: &Codebook,
) -> Result<(), ShapeMismatchError> {
    if codebook.num_rounds() != intensities.num_rounds() {
        return Err(ShapeMismatchError::new(
            "codebook rounds vs intensity rounds",
            codebook.num_rounds(),
            intensities.num_rounds(),
        ));
    }
    if codebook.num_chs() != intensities.num_chs() {
        return Err(ShapeMismatchError::new(
            "codebook channels vs intensity channels",
            codebook.num_chs(),
            intensities.num_chs(),
        ));
    }
    Ok(())
}

/// 记录一次解码的概况.
pub(crate) fn log_summary(name: &str, decoded: &IntensityTable) {
    let Some(targets) = decoded.targets() else {
        return;
    };
    let no_calls = targets.iter().filter(|t| t.is_no_call()).count();
    log::debug!(
        "{name}: decoded {} features, {} no-calls",
        targets.len(),
        no_calls
    );
    if !targets.is_empty() && no_calls == targets.len() {
        log::warn!("{name}: no feature matched any code in the codebook");
    }
}
