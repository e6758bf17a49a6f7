use crate::consts::Indices;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::ops::Index;

/// 遍历空间中的一个点: 维度到整数索引的映射.
///
/// 条目顺序与生成它的维度序列一致. 每个维度至多出现一次.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coordinate(Vec<(Indices, usize)>);

impl Coordinate {
    /// 获取维度 `dim` 上的索引. 该坐标不含 `dim` 时返回 `None`.
    #[inline]
    pub fn get(&self, dim: Indices) -> Option<usize> {
        self.0.iter().find(|(d, _)| *d == dim).map(|(_, v)| *v)
    }

    /// 坐标包含的维度个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空坐标 (零维空间中唯一的点)?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 是否包含维度 `dim`?
    #[inline]
    pub fn contains(&self, dim: Indices) -> bool {
        self.get(dim).is_some()
    }

    /// 按遍历序列顺序迭代 `(维度, 索引)`.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Indices, usize)> + '_ {
        self.0.iter().copied()
    }

    /// 按遍历序列顺序迭代维度.
    #[inline]
    pub fn dimensions(&self) -> impl ExactSizeIterator<Item = Indices> + '_ {
        self.0.iter().map(|(d, _)| *d)
    }
}

/// 缺失维度时 panic.
impl Index<Indices> for Coordinate {
    type Output = usize;

    fn index(&self, dim: Indices) -> &Self::Output {
        match self.0.iter().find(|(d, _)| *d == dim) {
            Some((_, v)) => v,
            None => panic!("坐标中不存在维度 `{dim}`"),
        }
    }
}

impl FromIterator<(Indices, usize)> for Coordinate {
    fn from_iter<T: IntoIterator<Item = (Indices, usize)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Coordinate> for BTreeMap<Indices, usize> {
    fn from(value: Coordinate) -> Self {
        value.0.into_iter().collect()
    }
}

/// 形如 `{r: 0, c: 1, z: 2}`.
impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (dim, v)) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{dim}: {v}")?;
        }
        f.write_str("}")
    }
}
