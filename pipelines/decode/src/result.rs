//! 解码结果概况.

use fish_berry::consts::features::{AXIS, NO_CALL, QUALITY, TARGET};
use fish_berry::IntensityTable;
use std::io::{self, Write};

/// 一次解码的统计结果.
pub struct DecodeSummary {
    decoder: &'static str,
    features: usize,
    /// 按目标名排序, 含 `"nan"`.
    counts: Vec<(String, usize)>,
    mean_quality: Option<f32>,
}

impl DecodeSummary {
    /// 统计已解码的强度表. 未解码时返回 `None`.
    pub fn new(decoder: &'static str, decoded: &IntensityTable) -> Option<Self> {
        let counts = decoded
            .target_counts()?
            .into_iter()
            .map(|(t, n)| (t.to_owned(), n))
            .collect();
        let qualities = decoded.qualities()?;
        let mean_quality = (!qualities.is_empty())
            .then(|| qualities.iter().sum::<f32>() / qualities.len() as f32);
        Some(Self {
            decoder,
            features: decoded.num_features(),
            counts,
            mean_quality,
        })
    }

    /// 未匹配特征个数.
    pub fn no_calls(&self) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| t == NO_CALL)
            .map_or(0, |(_, n)| *n)
    }

    /// 将结果写进 `w` 中.
    pub fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        const S4: &str = "    ";

        writeln!(w, "Decoder `{}`:", self.decoder)?;
        writeln!(w, "{S4}{AXIS}: {}", self.features)?;
        writeln!(w, "{S4}no-calls: {}", self.no_calls())?;
        match self.mean_quality {
            Some(q) => writeln!(w, "{S4}mean {QUALITY}: {q:.4}")?,
            None => writeln!(w, "{S4}mean {QUALITY}: /")?,
        }
        write!(w, "{S4}{TARGET}:")?;
        for (t, n) in self.counts.iter().filter(|(t, _)| t != NO_CALL) {
            write!(w, "\n{S4}{S4}{t}: {n}")?;
        }
        Ok(())
    }
}
