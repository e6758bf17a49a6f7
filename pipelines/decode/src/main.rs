//! `fish-decode`: FISH 强度表构建, 码本解码与质检图导出的命令行入口.

mod result;
mod runner;

use clap::{Args, Parser, Subcommand};
use fish_berry::decoder::{DecoderAlgorithm, MetricDistance, PerRoundMaxChannel};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "fish-decode")]
#[command(about = "Build, decode and inspect FISH intensity tables")]
#[command(version)]
struct Cli {
    /// Resolve relative paths against `$FISH_DATASET_DIR` (or `$HOME/dataset/fish`).
    #[arg(long, global = true)]
    in_dataset: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an intensity table archive from intensity and spot attribute `.npy` files.
    Build {
        /// `(feature, channel, round)` f32 intensities.
        #[arg(long)]
        data: PathBuf,

        /// `(n, 4)` f64 spot attributes, columns `z, y, x, radius`.
        #[arg(long)]
        spots: PathBuf,

        /// Output intensity table archive.
        #[arg(long)]
        output: PathBuf,
    },

    /// Decode an intensity table against a codebook.
    Decode(DecodeArgs),

    /// Render the intensity traces of one target as a PNG scatter plot.
    Traces {
        /// Decoded intensity table archive.
        #[arg(long)]
        intensities: PathBuf,

        /// Target name.
        #[arg(long)]
        target: String,

        /// Output PNG.
        #[arg(long)]
        output: PathBuf,

        /// Horizontal jitter width.
        #[arg(long, default_value = "0.8")]
        jitter: f32,

        /// Figure width in pixels.
        #[arg(long, default_value = "800")]
        width: u32,

        /// Figure height in pixels.
        #[arg(long, default_value = "400")]
        height: u32,
    },

    /// Export every tile of a 5D `(round, ch, z, y, x)` image stack as 8-bit PNG.
    Tiles {
        /// 5D f32 `.npy` image stack.
        #[arg(long)]
        stack: PathBuf,

        /// Output directory.
        #[arg(long)]
        output: PathBuf,

        /// Traversal order, slowest first, e.g. `r,c,z`.
        #[arg(long, value_delimiter = ',', default_value = "r,c,z")]
        order: Vec<String>,

        /// Map intensities through a fixed `[0, 1]` window instead of per-tile min-max.
        #[arg(long)]
        unit_window: bool,
    },
}

#[derive(Args)]
struct DecodeArgs {
    /// Intensity table archive.
    #[arg(long)]
    intensities: PathBuf,

    /// Codebook JSON manifest.
    #[arg(long)]
    codebook: PathBuf,

    /// Output intensity table archive with decode columns.
    #[arg(long)]
    output: PathBuf,

    /// Decoding threads; 0 lets rayon decide.
    #[arg(short, long, default_value_t = utils::cpus())]
    jobs: usize,

    #[command(subcommand)]
    decoder: DecoderCmd,
}

/// 解码器分派表.
#[derive(Subcommand)]
enum DecoderCmd {
    /// Exact match of the per-round max channel pattern.
    PerRoundMaxChannel,

    /// Nearest L2-normalized code within a distance threshold.
    MetricDistance {
        /// Maximum normalized distance to accept a code.
        #[arg(long, default_value_t = MetricDistance::DEFAULT_MAX_DISTANCE)]
        max_distance: f32,

        /// Minimum raw trace L2 norm to accept a code.
        #[arg(long, default_value_t = MetricDistance::DEFAULT_MIN_INTENSITY)]
        min_intensity: f32,
    },
}

impl DecoderCmd {
    fn into_algorithm(self) -> Box<dyn DecoderAlgorithm> {
        match self {
            Self::PerRoundMaxChannel => Box::new(PerRoundMaxChannel::new()),
            Self::MetricDistance {
                max_distance,
                min_intensity,
            } => Box::new(MetricDistance::new(max_distance, min_intensity)),
        }
    }
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    SimpleLogger::new().with_level(level(cli.verbose)).init()?;

    let paths = runner::PathResolver::new(cli.in_dataset)?;
    match cli.command {
        Commands::Build {
            data,
            spots,
            output,
        } => runner::build(&paths, &data, &spots, &output),
        Commands::Decode(args) => runner::decode(
            &paths,
            &args.intensities,
            &args.codebook,
            &args.output,
            args.decoder.into_algorithm().as_ref(),
            args.jobs,
        ),
        Commands::Traces {
            intensities,
            target,
            output,
            jitter,
            width,
            height,
        } => runner::traces(
            &paths,
            &intensities,
            &target,
            &output,
            runner::FigureOpts {
                jitter,
                width,
                height,
            },
        ),
        Commands::Tiles {
            stack,
            output,
            order,
            unit_window,
        } => runner::tiles(&paths, &stack, &output, &order, unit_window),
    }
}
