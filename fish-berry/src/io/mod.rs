//! 强度表的读写.
//!
//! 两种输入来源:
//!
//! 1. 两个 `.npy` 文件: `(feature, channel, round)` 的 `f32` 强度, 以及 `(n, 4)` 的 `f64` 光斑属性.
//! 2. 压缩归档 (需要 `serde` feature): `bincode` 序列化后用 zlib 压缩的完整强度表,
//!    包含解码列.

use ndarray::Array3;
use ndarray_npy::{read_npy, ReadNpyError};
use std::path::Path;

use crate::data::{IntensityTable, ShapeMismatchError, SpotAttributes, SpotFileError};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use flate2::read::ZlibDecoder;
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::fs::File;
        use std::io::{BufReader, BufWriter, Write};
    }
}

/// 强度表读写错误.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// 底层 I/O 错误.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// 归档内容无法 (反) 序列化.
    #[cfg(feature = "serde")]
    #[error("malformed intensity archive: {0}")]
    Bincode(#[from] bincode::Error),

    /// 强度 `.npy` 读取失败.
    #[error("failed to read intensity npy: {0}")]
    Npy(#[from] ReadNpyError),

    /// 光斑属性文件读取失败.
    #[error("failed to read spot attributes: {0}")]
    Spots(#[from] SpotFileError),

    /// 强度与光斑属性不对齐.
    #[error(transparent)]
    Shape(#[from] ShapeMismatchError),
}

/// 强度表读写结果.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// 从强度 `.npy` 和光斑属性 `.npy` 构建强度表.
pub fn read_spot_data<P: AsRef<Path>, Q: AsRef<Path>>(
    data_path: P,
    spots_path: Q,
) -> ArchiveResult<IntensityTable> {
    let data: Array3<f32> = read_npy(data_path.as_ref())?;
    let spots = SpotAttributes::open_npy(spots_path.as_ref())?;
    let ans = IntensityTable::from_spot_data(data, spots)?;
    log::debug!(
        "built intensity table {:?} from {}",
        ans.shape(),
        data_path.as_ref().display()
    );
    Ok(ans)
}

/// 归档部分
#[cfg(feature = "serde")]
impl IntensityTable {
    /// 把完整强度表 (含解码列) 压缩保存到 `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ArchiveResult<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        let mut e = ZlibEncoder::new(writer, Compression::default());
        bincode::serialize_into(&mut e, self)?;
        e.finish()?.flush()?;
        log::debug!(
            "saved intensity table {:?} to {}",
            self.shape(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// 读取由 [`IntensityTable::save`] 保存的强度表.
    ///
    /// 读取后会重新检查特征数与光斑属性行数是否一致.
    pub fn open<P: AsRef<Path>>(path: P) -> ArchiveResult<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let table: IntensityTable = bincode::deserialize_from(ZlibDecoder::new(reader))?;
        table.check_alignment()?;
        Ok(table)
    }
}
