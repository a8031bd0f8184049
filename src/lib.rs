//! rugaps
//!
//! Compresses long introns for transcript structure plots. Exons keep their true
//! width, gaps without exon coverage wider than a target width are drawn at that
//! width, and coordinates are rescaled so every transcript is laid out end to end.
//!
//! Coordinates are 1-based and inclusive. Introns use the abutting convention: an
//! intron starts at its left exon's end and ends at its right exon's start.

pub mod error;
pub mod frame;
pub mod gap_map;
pub mod gaps;
pub mod introns;
pub mod io;
pub mod options;
pub mod rescale;
pub mod rugaps_structs;
pub mod shorten;
pub mod sorts;

#[cfg(feature = "python")]
pub mod numpy_bindings;

pub use error::{GapError, Result};
pub use frame::{get_type, shorten_gaps, to_introns, TableKind, REQUIRED_COLUMNS};
pub use options::ShortenOptions;
pub use rescale::shorten_gaps_intervals;
pub use rugaps_structs::{
    Coord, FeatureType, Gap, GapHit, GapMap, Interval, RescaledInterval, ShortenType,
    ShortenedInterval, Strand,
};
