//! 数据集目录定位.

use std::env;
use std::path::{Path, PathBuf};

/// 数据集目录环境变量名.
pub const DATASET_DIR_ENV: &str = "FISH_DATASET_DIR";

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 获取 FISH 数据集基本路径.
///
/// 1. 若环境变量 `$FISH_DATASET_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/fish`;
/// 3. 找不到用户主目录时返回 `None`.
pub fn dataset_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(DATASET_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["fish"]),
    }
}

/// 把相对路径解析到 `base` 之下. 绝对路径原样返回.
pub fn resolve_in<P: AsRef<Path>>(base: &Path, path: P) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
