use polars::prelude::DataFrame;

use crate::error::{GapError, Result};
use crate::frame;

pub const DEFAULT_TARGET_GAP_WIDTH: i64 = 100;

/// Settings for a `shorten_gaps` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenOptions {
    /// Width that longer gaps are drawn at.
    pub target_gap_width: i64,
    /// Columns identifying a transcript. Empty means one layout for all rows.
    pub group_by: Vec<String>,
}

impl Default for ShortenOptions {
    fn default() -> Self {
        ShortenOptions {
            target_gap_width: DEFAULT_TARGET_GAP_WIDTH,
            group_by: Vec::new(),
        }
    }
}

impl ShortenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_gap_width(mut self, target_gap_width: i64) -> Self {
        self.target_gap_width = target_gap_width;
        self
    }

    pub fn with_group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_gap_width <= 0 {
            return Err(GapError::InvalidInput(format!(
                "target_gap_width must be positive, got {}",
                self.target_gap_width
            )));
        }
        if let Some(empty) = self.group_by.iter().find(|c| c.is_empty()) {
            return Err(GapError::InvalidInput(format!(
                "group_by column names must not be empty, got {:?}",
                empty
            )));
        }
        Ok(())
    }

    fn group_by_columns(&self) -> Vec<&str> {
        self.group_by.iter().map(String::as_str).collect()
    }

    pub fn shorten(&self, exons: &DataFrame, introns: &DataFrame) -> Result<DataFrame> {
        self.validate()?;
        let group_by = self.group_by_columns();
        let group_by = (!group_by.is_empty()).then_some(group_by.as_slice());
        frame::shorten_gaps(exons, introns, group_by, self.target_gap_width)
    }

    /// Introns derived from `exons`, grouped by the configured columns.
    pub fn introns_from(&self, exons: &DataFrame) -> Result<DataFrame> {
        self.validate()?;
        frame::to_introns(exons, &self.group_by_columns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ShortenOptions::default();
        assert_eq!(options.target_gap_width, 100);
        assert!(options.group_by.is_empty());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let options = ShortenOptions::new()
            .with_target_gap_width(50)
            .with_group_by(["transcript_id", "sample"]);
        assert_eq!(options.target_gap_width, 50);
        assert_eq!(options.group_by, vec!["transcript_id", "sample"]);
    }

    #[test]
    fn zero_width_is_invalid() {
        let err = ShortenOptions::new()
            .with_target_gap_width(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, GapError::InvalidInput(_)));
    }

    #[test]
    fn empty_group_column_is_invalid() {
        let err = ShortenOptions::new()
            .with_group_by([""])
            .validate()
            .unwrap_err();
        assert!(matches!(err, GapError::InvalidInput(_)));
    }
}
