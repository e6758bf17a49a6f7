//! 码本: 目标名到逐轮期望通道的映射.
//!
//! 码本在加载后不可变, 并以引用形式显式传递给每一次解码调用.

use ndarray::Array3;
use std::collections::HashMap;

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        mod manifest;
    }
}

/// 单个目标的码字.
///
/// `channels[r]` 是第 `r` 轮中期望 "点亮" (强度最大) 的通道.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Code {
    target: String,
    channels: Vec<usize>,
}

impl Code {
    /// 直接初始化. 合法性由 [`Codebook::new`] 检查.
    #[inline]
    pub fn new(target: impl Into<String>, channels: Vec<usize>) -> Self {
        Self {
            target: target.into(),
            channels,
        }
    }

    /// 目标名.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 逐轮期望通道.
    #[inline]
    pub fn channels(&self) -> &[usize] {
        &self.channels
    }
}

/// 码本构建 / 加载错误.
#[derive(Debug, thiserror::Error)]
pub enum CodebookError {
    /// 轮次数或通道数为 0.
    #[error("codebook has {rounds} rounds and {chs} channels, both must be positive")]
    EmptyAxis {
        /// 轮次数.
        rounds: usize,
        /// 通道数.
        chs: usize,
    },

    /// 码字的目标名为空. 参数为码字位置.
    #[error("code #{0} has an empty target name")]
    EmptyTarget(usize),

    /// 码字长度与轮次数不符.
    #[error("code `{target}` has {actual} rounds, expected {expected}")]
    WrongCodeLength {
        /// 目标名.
        target: String,
        /// 期望长度 (轮次数).
        expected: usize,
        /// 实际长度.
        actual: usize,
    },

    /// 码字中的通道越界.
    #[error("code `{target}` uses channel {channel} in round {round} of {num_chs} channels")]
    ChannelOutOfRange {
        /// 目标名.
        target: String,
        /// 轮次.
        round: usize,
        /// 越界通道.
        channel: usize,
        /// 通道数.
        num_chs: usize,
    },

    /// 目标名重复.
    #[error("target `{0}` appears more than once")]
    DuplicateTarget(String),

    /// 清单中某轮点亮的通道个数不是 1.
    #[error("code `{target}` has {on} active channels in round {round}, expected exactly 1")]
    AmbiguousRound {
        /// 目标名.
        target: String,
        /// 轮次.
        round: usize,
        /// 点亮通道个数.
        on: usize,
    },

    /// 清单中的轮次或通道编号过大, 无法得到轴长度.
    #[error("manifest index {0} is too large")]
    IndexOverflow(usize),

    /// 清单 JSON 解析错误.
    #[cfg(feature = "serde")]
    #[error("malformed codebook manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// 底层 I/O 错误.
    #[error("failed to read codebook manifest: {0}")]
    Io(#[from] std::io::Error),
}

/// 码本构建 / 加载结果.
pub type CodebookResult<T> = Result<T, CodebookError>;

/// 不可变码本.
///
/// 所有码字长度都等于 `num_rounds`, 所有通道都小于 `num_chs`, 目标名唯一.
#[derive(Clone, Debug)]
pub struct Codebook {
    num_rounds: usize,
    num_chs: usize,
    codes: Vec<Code>,
    /// 目标名 -> 码字位置.
    by_target: HashMap<String, usize>,
    /// 码字 -> 第一个拥有该码字的位置.
    by_pattern: HashMap<Vec<usize>, usize>,
}

impl Codebook {
    /// 构建码本并检查每个码字.
    ///
    /// 多个目标共享同一码字时, 解码总是选择靠前的那个.
    pub fn new(num_rounds: usize, num_chs: usize, codes: Vec<Code>) -> CodebookResult<Self> {
        if num_rounds == 0 || num_chs == 0 {
            return Err(CodebookError::EmptyAxis {
                rounds: num_rounds,
                chs: num_chs,
            });
        }

        let mut by_target = HashMap::with_capacity(codes.len());
        let mut by_pattern = HashMap::with_capacity(codes.len());
        for (i, code) in codes.iter().enumerate() {
            if code.target.is_empty() {
                return Err(CodebookError::EmptyTarget(i));
            }
            if code.channels.len() != num_rounds {
                return Err(CodebookError::WrongCodeLength {
                    target: code.target.clone(),
                    expected: num_rounds,
                    actual: code.channels.len(),
                });
            }
            if let Some((round, &channel)) =
                code.channels.iter().enumerate().find(|&(_, &c)| c >= num_chs)
            {
                return Err(CodebookError::ChannelOutOfRange {
                    target: code.target.clone(),
                    round,
                    channel,
                    num_chs,
                });
            }
            if by_target.insert(code.target.clone(), i).is_some() {
                return Err(CodebookError::DuplicateTarget(code.target.clone()));
            }
            by_pattern.entry(code.channels.clone()).or_insert(i);
        }

        Ok(Self {
            num_rounds,
            num_chs,
            codes,
            by_target,
            by_pattern,
        })
    }

    /// 轮次数.
    #[inline]
    pub fn num_rounds(&self) -> usize {
        self.num_rounds
    }

    /// 通道数.
    #[inline]
    pub fn num_chs(&self) -> usize {
        self.num_chs
    }

    /// 码字个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// 是否没有任何码字?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// 通过目标名获取码字.
    #[inline]
    pub fn get(&self, target: &str) -> Option<&Code> {
        self.by_target.get(target).map(|&i| &self.codes[i])
    }

    /// 获取第 `index` 个码字. 越界时 panic.
    #[inline]
    pub fn code_at(&self, index: usize) -> &Code {
        &self.codes[index]
    }

    /// 按加载顺序迭代码字.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Code> {
        self.codes.iter()
    }

    /// 查找码字恰好等于 `pattern` 的目标. 多个目标共享码字时返回靠前的那个.
    #[inline]
    pub fn find_exact(&self, pattern: &[usize]) -> Option<&Code> {
        self.by_pattern.get(pattern).map(|&i| &self.codes[i])
    }

    /// 码本的独热 (one-hot) 数组形式, 按 `(target, channel, round)` 组织.
    pub fn code_array(&self) -> Array3<f32> {
        let mut ans = Array3::zeros((self.len(), self.num_chs, self.num_rounds));
        for (i, code) in self.codes.iter().enumerate() {
            for (round, &ch) in code.channels.iter().enumerate() {
                ans[(i, ch, round)] = 1.0;
            }
        }
        ans
    }
}

impl<'a> IntoIterator for &'a Codebook {
    type Item = &'a Code;
    type IntoIter = std::slice::Iter<'a, Code>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_targets() -> Codebook {
        Codebook::new(
            2,
            2,
            vec![Code::new("ACTB", vec![0, 1]), Code::new("GAPDH", vec![1, 0])],
        )
        .unwrap()
    }

    #[test]
    fn test_codebook_lookup() {
        let cb = two_targets();
        assert_eq!(cb.len(), 2);
        assert_eq!(cb.num_rounds(), 2);
        assert_eq!(cb.num_chs(), 2);
        assert_eq!(cb.get("GAPDH").unwrap().channels(), &[1, 0]);
        assert!(cb.get("nan").is_none());
        assert_eq!(cb.find_exact(&[0, 1]).unwrap().target(), "ACTB");
        assert!(cb.find_exact(&[0, 0]).is_none());
        assert_eq!(cb.iter().map(Code::target).collect::<Vec<_>>(), ["ACTB", "GAPDH"]);
    }

    #[test]
    fn test_code_array_is_one_hot() {
        let arr = two_targets().code_array();
        assert_eq!(arr.dim(), (2, 2, 2));
        assert_eq!(arr[(0, 0, 0)], 1.0);
        assert_eq!(arr[(0, 1, 1)], 1.0);
        assert_eq!(arr[(1, 1, 0)], 1.0);
        assert_eq!(arr.sum(), 4.0);
    }

    #[test]
    fn test_shared_pattern_prefers_first() {
        let codes = vec![Code::new("A", vec![1]), Code::new("B", vec![1])];
        let cb = Codebook::new(1, 2, codes).unwrap();
        assert_eq!(cb.find_exact(&[1]).unwrap().target(), "A");
    }

    #[test]
    fn test_codebook_validation() {
        assert!(matches!(
            Codebook::new(0, 2, vec![]),
            Err(CodebookError::EmptyAxis { rounds: 0, chs: 2 })
        ));
        assert!(matches!(
            Codebook::new(2, 2, vec![Code::new("A", vec![0])]),
            Err(CodebookError::WrongCodeLength { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            Codebook::new(2, 2, vec![Code::new("A", vec![0, 2])]),
            Err(CodebookError::ChannelOutOfRange { round: 1, channel: 2, .. })
        ));
        assert!(matches!(
            Codebook::new(1, 2, vec![Code::new("A", vec![0]), Code::new("A", vec![1])]),
            Err(CodebookError::DuplicateTarget(t)) if t == "A"
        ));
        assert!(matches!(
            Codebook::new(1, 2, vec![Code::new("", vec![0])]),
            Err(CodebookError::EmptyTarget(0))
        ));
        assert!(Codebook::new(3, 4, vec![]).unwrap().is_empty());
    }
}
