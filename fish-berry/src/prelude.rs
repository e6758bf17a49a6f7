//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{
    ImageStack, ImgWriteVis, IntensityTable, IntensityWindow, ShapeMismatchError, SpotAttribute,
    SpotAttributes, Target, TileSlice,
};

pub use crate::consts::Indices;

pub use crate::traversal::{join_dimension_sizes, ordered_iterator, Coordinate, TraversalError};

pub use crate::codebook::{Code, Codebook, CodebookError};

pub use crate::decoder::{DecodeError, DecoderAlgorithm, MetricDistance, PerRoundMaxChannel};

pub use crate::plot::{intensities_by_target, PlotError, TargetTraces};

pub use crate::io::{read_spot_data, ArchiveError};
