//! 码本 JSON 清单的读写.
//!
//! 清单格式:
//!
//! ```json
//! [
//!   {"codeword": [{"r": 0, "c": 1, "v": 1}, {"r": 1, "c": 0, "v": 1}], "target": "ACTB"}
//! ]
//! ```
//!
//! 也接受 `{"mappings": [...]}` 包装形式. 每个码字在每一轮必须恰好有一个 `v > 0` 的通道.

use super::{Code, Codebook, CodebookError, CodebookResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct CodewordEntry {
    r: usize,
    c: usize,
    v: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestEntry {
    codeword: Vec<CodewordEntry>,
    target: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Manifest {
    Bare(Vec<ManifestEntry>),
    Wrapped { mappings: Vec<ManifestEntry> },
}

impl Manifest {
    fn into_entries(self) -> Vec<ManifestEntry> {
        match self {
            Self::Bare(v) => v,
            Self::Wrapped { mappings } => mappings,
        }
    }
}

impl Codebook {
    /// 从 JSON 清单字符串加载码本.
    ///
    /// 轮次数和通道数分别取清单中出现过的最大 `r`, `c` 加一.
    /// `v <= 0` 的条目只参与推断轴长度, 不算作点亮.
    pub fn from_json_str(s: &str) -> CodebookResult<Self> {
        let manifest: Manifest = serde_json::from_str(s)?;
        Self::from_entries(manifest.into_entries())
    }

    /// 从本地 JSON 清单文件加载码本.
    pub fn open_json<P: AsRef<Path>>(path: P) -> CodebookResult<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let manifest: Manifest = serde_json::from_reader(reader)?;
        let ans = Self::from_entries(manifest.into_entries())?;
        log::debug!(
            "loaded codebook with {} targets ({} rounds x {} channels) from {}",
            ans.len(),
            ans.num_rounds(),
            ans.num_chs(),
            path.as_ref().display()
        );
        Ok(ans)
    }

    /// 序列化为 JSON 清单字符串 (裸数组形式).
    ///
    /// 每个码字都写出全部 `(r, c)` 条目, 未点亮的记为 `v = 0`,
    /// 以便重新加载时推断出相同的轮次数和通道数.
    pub fn to_json_string(&self) -> CodebookResult<String> {
        let entries: Vec<ManifestEntry> = self
            .iter()
            .map(|code| ManifestEntry {
                codeword: code
                    .channels()
                    .iter()
                    .enumerate()
                    .flat_map(|(r, &on)| {
                        (0..self.num_chs()).map(move |c| CodewordEntry {
                            r,
                            c,
                            v: if c == on { 1.0 } else { 0.0 },
                        })
                    })
                    .collect(),
                target: code.target().to_owned(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    fn from_entries(entries: Vec<ManifestEntry>) -> CodebookResult<Self> {
        let mut num_rounds = 0;
        let mut num_chs = 0;
        for w in entries.iter().flat_map(|e| e.codeword.iter()) {
            num_rounds = axis_len(w.r)?.max(num_rounds);
            num_chs = axis_len(w.c)?.max(num_chs);
        }

        let mut codes = Vec::with_capacity(entries.len());
        for entry in entries {
            // 稀疏存储: 轮次编号只受清单内容约束, 不能据此预分配.
            let mut on: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            for w in entry.codeword.iter().filter(|w| w.v > 0.0) {
                on.entry(w.r).or_default().push(w.c);
            }
            let mut channels = Vec::with_capacity(on.len());
            for round in 0..num_rounds {
                match on.get(&round).map(Vec::as_slice) {
                    Some([ch]) => channels.push(*ch),
                    other => {
                        return Err(CodebookError::AmbiguousRound {
                            target: entry.target,
                            round,
                            on: other.map_or(0, <[usize]>::len),
                        })
                    }
                }
            }
            codes.push(Code::new(entry.target, channels));
        }
        Codebook::new(num_rounds, num_chs, codes)
    }
}

/// 由最大编号得到轴长度.
fn axis_len(index: usize) -> CodebookResult<usize> {
    index
        .checked_add(1)
        .ok_or(CodebookError::IndexOverflow(index))
}

#[cfg(test)]
mod tests {
    use crate::codebook::{Code, Codebook, CodebookError};

    const MANIFEST: &str = r#"[
        {"codeword": [{"r": 0, "c": 1, "v": 1}, {"r": 1, "c": 0, "v": 1}, {"r": 1, "c": 2, "v": 0}],
         "target": "ACTB"},
        {"codeword": [{"r": 0, "c": 0, "v": 1}, {"r": 1, "c": 1, "v": 1}], "target": "GAPDH"}
    ]"#;

    #[test]
    fn test_from_json_str() {
        let cb = Codebook::from_json_str(MANIFEST).unwrap();
        assert_eq!(cb.num_rounds(), 2);
        assert_eq!(cb.num_chs(), 3);
        assert_eq!(cb.get("ACTB").unwrap().channels(), &[1, 0]);
        assert_eq!(cb.get("GAPDH").unwrap().channels(), &[0, 1]);
    }

    #[test]
    fn test_wrapped_manifest() {
        let wrapped = format!(r#"{{"version": "0.0.0", "mappings": {MANIFEST}}}"#);
        let cb = Codebook::from_json_str(&wrapped).unwrap();
        assert_eq!(cb.len(), 2);
    }

    #[test]
    fn test_ambiguous_round() {
        let s = r#"[{"codeword": [{"r": 0, "c": 0, "v": 1}, {"r": 0, "c": 1, "v": 1}],
                     "target": "X"}]"#;
        assert!(matches!(
            Codebook::from_json_str(s),
            Err(CodebookError::AmbiguousRound { round: 0, on: 2, .. })
        ));

        let s = r#"[
            {"codeword": [{"r": 0, "c": 0, "v": 1}], "target": "X"},
            {"codeword": [{"r": 1, "c": 0, "v": 1}], "target": "Y"}
        ]"#;
        assert!(matches!(
            Codebook::from_json_str(s),
            Err(CodebookError::AmbiguousRound { round: 1, on: 0, .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Codebook::from_json_str("{\"codeword\": 3}"),
            Err(CodebookError::Json(_))
        ));
    }

    #[test]
    fn test_json_file_round_trip() {
        let cb = Codebook::new(
            3,
            4,
            vec![Code::new("A", vec![0, 3, 2]), Code::new("B", vec![1, 1, 1])],
        )
        .unwrap();
        let path = std::env::temp_dir().join("fish_berry_codebook_round_trip.json");
        std::fs::write(&path, cb.to_json_string().unwrap()).unwrap();

        let back = Codebook::open_json(&path).unwrap();
        assert_eq!(back.num_rounds(), 3);
        assert_eq!(back.num_chs(), 4);
        assert_eq!(back.iter().collect::<Vec<_>>(), cb.iter().collect::<Vec<_>>());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_round_trip_keeps_unused_channels() {
        // 通道 2, 3 从未点亮.
        let cb = Codebook::new(2, 4, vec![Code::new("A", vec![0, 1]), Code::new("B", vec![1, 0])])
            .unwrap();
        let back = Codebook::from_json_str(&cb.to_json_string().unwrap()).unwrap();
        assert_eq!(back.num_rounds(), 2);
        assert_eq!(back.num_chs(), 4);
        assert_eq!(back.code_array(), cb.code_array());
    }

    #[test]
    fn test_huge_indices_are_rejected() {
        let big = usize::MAX;
        let s = format!(r#"[{{"codeword": [{{"r": {big}, "c": 0, "v": 1}}], "target": "X"}}]"#);
        assert!(matches!(
            Codebook::from_json_str(&s),
            Err(CodebookError::IndexOverflow(i)) if i == usize::MAX
        ));

        let s = format!(r#"[{{"codeword": [{{"r": 0, "c": {big}, "v": 0}}], "target": "X"}}]"#);
        assert!(matches!(
            Codebook::from_json_str(&s),
            Err(CodebookError::IndexOverflow(_))
        ));

        // 轮次编号极大但合法: 第 0 轮缺失, 不会按轮次数分配内存.
        let s = r#"[{"codeword": [{"r": 1000000000000, "c": 0, "v": 1}], "target": "X"}]"#;
        assert!(matches!(
            Codebook::from_json_str(s),
            Err(CodebookError::AmbiguousRound { round: 0, on: 0, .. })
        ));
    }
}
