//! 各子命令的实际运行函数.

use crate::result::DecodeSummary;
use crate::CliResult;
use fish_berry::consts::Indices;
use fish_berry::decoder::DecoderAlgorithm;
use fish_berry::plot::intensities_by_target;
use fish_berry::{codebook::Codebook, io, ImageStack, ImgWriteVis, IntensityTable};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::io::Write;
use std::path::{Path, PathBuf};
use utils::loader;

/// 按 `--in-dataset` 决定相对路径的基准目录.
pub struct PathResolver {
    base: Option<PathBuf>,
}

impl PathResolver {
    /// `in_dataset` 为真时定位数据集目录, 找不到时报错.
    pub fn new(in_dataset: bool) -> CliResult<Self> {
        if !in_dataset {
            return Ok(Self { base: None });
        }
        let base = loader::dataset_dir_from_env_or_home()
            .ok_or("cannot locate the dataset directory: set $FISH_DATASET_DIR")?;
        log::debug!("resolving paths against {}", base.display());
        Ok(Self { base: Some(base) })
    }

    /// 解析路径.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base {
            Some(base) => loader::resolve_in(base, path),
            None => path.to_path_buf(),
        }
    }
}

/// 质检图参数.
pub struct FigureOpts {
    pub jitter: f32,
    pub width: u32,
    pub height: u32,
}

/// `build` 子命令.
pub fn build(paths: &PathResolver, data: &Path, spots: &Path, output: &Path) -> CliResult<()> {
    let table = io::read_spot_data(paths.resolve(data), paths.resolve(spots))?;
    let (features, chs, rounds) = table.shape();
    log::info!("{features} features, {chs} channels, {rounds} rounds");
    table.save(paths.resolve(output))?;
    Ok(())
}

/// 运行解码器的 `rayon` 线程池. `jobs` 为 0 时由 `rayon` 自行决定线程数.
pub fn decode_pool(jobs: usize) -> CliResult<ThreadPool> {
    let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
    log::debug!("decoding with {} threads", pool.current_num_threads());
    Ok(pool)
}

/// `decode` 子命令.
pub fn decode(
    paths: &PathResolver,
    intensities: &Path,
    codebook: &Path,
    output: &Path,
    decoder: &dyn DecoderAlgorithm,
    jobs: usize,
) -> CliResult<()> {
    let table = IntensityTable::open(paths.resolve(intensities))?;
    let codebook = Codebook::open_json(paths.resolve(codebook))?;
    log::info!(
        "decoding {} features with {}",
        table.num_features(),
        decoder.name()
    );
    let decoded = decode_pool(jobs)?.install(|| decoder.run_parallel(&table, &codebook))?;
    decoded.save(paths.resolve(output))?;

    if let Some(summary) = DecodeSummary::new(decoder.name(), &decoded) {
        write_summary(&summary, std::io::stdout().lock())?;
    }
    Ok(())
}

/// 在两条分隔线之间写出解码概况.
fn write_summary<W: Write>(summary: &DecodeSummary, mut w: W) -> std::io::Result<()> {
    utils::sep_to(&mut w)?;
    summary.describe_into(&mut w)?;
    writeln!(w)?;
    utils::sep_to(&mut w)
}

/// `traces` 子命令.
pub fn traces(
    paths: &PathResolver,
    intensities: &Path,
    target: &str,
    output: &Path,
    opts: FigureOpts,
) -> CliResult<()> {
    let table = IntensityTable::open(paths.resolve(intensities))?;
    let traces = intensities_by_target(&table, target)?.with_jitter(opts.jitter);
    if traces.num_features() == 0 {
        log::warn!("no feature is assigned to `{target}`");
    }
    traces
        .render(opts.width, opts.height)
        .save(paths.resolve(output))?;
    Ok(())
}

/// 解析 `r,c,z` 形式的遍历顺序.
pub fn parse_order<S: AsRef<str>>(names: &[S]) -> CliResult<Vec<Indices>> {
    names
        .iter()
        .map(|n| {
            let n = n.as_ref().trim();
            Indices::from_name(n).ok_or_else(|| format!("unknown dimension `{n}`").into())
        })
        .collect()
}

/// `tiles` 子命令.
///
/// `unit_window` 为真时所有 tile 共用 `[0, 1]` 显示窗口, 否则每个 tile 按自身 min-max 规范化.
pub fn tiles(
    paths: &PathResolver,
    stack: &Path,
    output: &Path,
    order: &[String],
    unit_window: bool,
) -> CliResult<()> {
    let order = parse_order(order)?;
    let stack = ImageStack::open_npy(paths.resolve(stack))?;
    let dir = paths.resolve(output);
    std::fs::create_dir_all(&dir)?;
    let window = unit_window.then(utils::unit_window);

    let mut n = 0usize;
    for (coord, tile) in stack.tiles(order)? {
        let name = format!(
            "tile_r{}_c{}_z{}.png",
            coord[Indices::Round],
            coord[Indices::Ch],
            coord[Indices::Z]
        );
        log::trace!("{coord} -> {name}");
        match &window {
            Some(w) => tile.to_gray_image(w).save(dir.join(name))?,
            None => tile.save(dir.join(name))?,
        }
        n += 1;
    }
    log::info!("wrote {n} tiles to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order(&["z", " r"][..]).unwrap(), [Indices::Z, Indices::Round]);
        assert!(parse_order(&["q"][..]).is_err());
    }

    #[test]
    fn test_summary_between_separators() {
        use fish_berry::codebook::Code;
        use fish_berry::decoder::PerRoundMaxChannel;

        let cb = Codebook::new(2, 2, vec![Code::new("A", vec![0, 1])]).unwrap();
        let table = IntensityTable::synthetic(&cb, 3);
        let decoded = decode_pool(2)
            .unwrap()
            .install(|| PerRoundMaxChannel.run_parallel(&table, &cb))
            .unwrap();
        assert_eq!(decoded, PerRoundMaxChannel.run(&table, &cb).unwrap());

        let summary = DecodeSummary::new(PerRoundMaxChannel::NAME, &decoded).unwrap();
        let mut buf = Vec::new();
        write_summary(&summary, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].chars().all(|c| c == '-'));
        assert_eq!(lines.first(), lines.last());
        assert!(text.contains("Decoder `PerRoundMaxChannel`:"));
        assert!(text.contains("A: 3"));
    }

    #[test]
    fn test_tiles_with_unit_window() {
        use ndarray::Array5;
        use ndarray_npy::write_npy;

        let root = std::env::temp_dir().join("fish_decode_unit_window");
        let stack = root.join("stack.npy");
        std::fs::create_dir_all(&root).unwrap();
        let data = Array5::from_shape_fn((1, 1, 2, 2, 2), |(_, _, z, y, x)| {
            (z * 4 + y * 2 + x) as f32 / 8.0
        });
        write_npy(&stack, &data).unwrap();

        let paths = PathResolver::new(false).unwrap();
        let out = root.join("tiles");
        tiles(&paths, &stack, &out, &["z".to_string()], true).unwrap();
        let z1 = image::open(out.join("tile_r0_c0_z1.png")).unwrap().to_luma8();
        // 0.875 * 255 截断.
        assert_eq!(z1.get_pixel(1, 1).0[0], 223);
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_resolver_without_dataset() {
        let r = PathResolver::new(false).unwrap();
        assert_eq!(r.resolve(Path::new("a/b.npy")), PathBuf::from("a/b.npy"));
    }
}
