use crate::consts::features::NO_CALL;
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个特征的解码目标.
///
/// 未匹配任何码字是正常结果, 以 [`Target::NoCall`] 记录, 而不是错误.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Target {
    /// 码本中的具名目标.
    Named(String),

    /// 未匹配任何码字.
    NoCall,
}

impl Target {
    /// 具名目标的名称. `NoCall` 返回 `None`.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(s) => Some(s.as_str()),
            Self::NoCall => None,
        }
    }

    /// 是否未匹配?
    #[inline]
    pub fn is_no_call(&self) -> bool {
        matches!(self, Self::NoCall)
    }

    /// 列值形式. `NoCall` 记作 `"nan"`.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.name().unwrap_or(NO_CALL)
    }

    /// 列值是否等于 `name`? `NoCall` 与 `"nan"` 相等.
    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.as_str() == name
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
