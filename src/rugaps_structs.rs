use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use num_traits::{PrimInt, Signed};

use crate::error::GapError;

/// Integer type usable as a genomic coordinate.
pub trait Coord: PrimInt + Signed + Hash + fmt::Debug + radsort::Key {}

impl<T> Coord for T where T: PrimInt + Signed + Hash + fmt::Debug + radsort::Key {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(GapError::InvalidInput(format!(
                "strand must be '+' or '-', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => f.write_str("+"),
            Strand::Reverse => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureType {
    Exon,
    Intron,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Exon => "exon",
            FeatureType::Intron => "intron",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of an exon or intron table.
/// - `chr`: encoded seqnames
/// - `group`: encoded group key (0 when no grouping is used)
/// - `idx`: row of the source table the interval came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval<C: Coord> {
    pub chr: i64,
    pub strand: Strand,
    pub start: C,
    pub end: C,
    pub group: i64,
    pub idx: usize,
}

impl<C: Coord> Interval<C> {
    /// Inclusive width, `end - start + 1`.
    #[inline]
    pub fn width(&self) -> C {
        self.end - self.start + C::one()
    }
}

/// A region with no exon coverage between two merged exon blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gap<C: Coord> {
    pub start: C,
    pub end: C,
}

impl<C: Coord> Gap<C> {
    #[inline]
    pub fn width(&self) -> C {
        self.end - self.start + C::one()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GapHit {
    pub gap_idx: usize,
    pub candidate_idx: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapMap {
    pub equal: Vec<GapHit>,
    pub pure_within: Vec<GapHit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortenType {
    None,
    Equal,
    PureWithin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedInterval<C: Coord> {
    pub interval: Interval<C>,
    pub width: C,
    pub shortened_width: C,
    pub shorten_type: ShortenType,
}

/// Output row of the rescaler, in rescaled coordinates.
/// `idx` points back into the exon or intron input, depending on `feature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RescaledInterval<C: Coord> {
    pub feature: FeatureType,
    pub idx: usize,
    pub group: i64,
    pub start: C,
    pub end: C,
}
