use std::time::Instant;

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{GapError, Result};
use crate::gap_map::get_gap_map;
use crate::rugaps_structs::{Coord, Gap, GapMap, Interval, ShortenType, ShortenedInterval};

pub(crate) fn check_target_gap_width<C: Coord>(target_gap_width: C) -> Result<()> {
    if target_gap_width <= C::zero() {
        return Err(GapError::InvalidInput(format!(
            "target_gap_width must be positive, got {:?}",
            target_gap_width
        )));
    }
    Ok(())
}

/// Computes the capped width of every candidate (intron or transcript-start gap).
///
/// - `Equal` rows are capped at `target_gap_width`.
/// - `PureWithin` rows lose, for each gap they contain, the part of that gap above
///   `target_gap_width`. The rest of the row keeps its true width.
/// - All other rows keep their width.
///
/// A row found in both relations is treated as `Equal`.
pub fn get_shortened_gaps<C: Coord>(
    candidates: &[Interval<C>],
    gaps: &[Gap<C>],
    gap_map: &GapMap,
    target_gap_width: C,
) -> Result<Vec<ShortenedInterval<C>>> {
    check_target_gap_width(target_gap_width)?;

    let mut shorten_types = vec![ShortenType::None; candidates.len()];
    let mut reductions = vec![C::zero(); candidates.len()];

    for hit in &gap_map.pure_within {
        shorten_types[hit.candidate_idx] = ShortenType::PureWithin;

        let gap_width = gaps[hit.gap_idx].width();
        let shortened_gap_width = gap_width.min(target_gap_width);
        reductions[hit.candidate_idx] =
            reductions[hit.candidate_idx] + (gap_width - shortened_gap_width);
    }
    for hit in &gap_map.equal {
        shorten_types[hit.candidate_idx] = ShortenType::Equal;
    }

    let shortened = candidates
        .iter()
        .zip(shorten_types)
        .zip(reductions)
        .map(|((candidate, shorten_type), reduction)| {
            let width = candidate.width();
            let shortened_width = match shorten_type {
                ShortenType::Equal => width.min(target_gap_width),
                ShortenType::PureWithin => width - reduction,
                ShortenType::None => width,
            };
            ShortenedInterval {
                interval: candidate.clone(),
                width,
                shortened_width,
                shorten_type,
            }
        })
        .collect();

    Ok(shortened)
}

/// Builds one leading span per group, from the leftmost exon of the whole input
/// up to (not including) the group's own first exon.
///
/// The leftmost group gets an empty span `[min, min - 1]` of width 0.
/// Output is sorted by group.
pub fn get_tx_start_gaps<C: Coord>(exons: &[Interval<C>]) -> Vec<Interval<C>> {
    let Some(first) = exons.first() else {
        return Vec::new();
    };

    let mut group_starts: FxHashMap<i64, C> = FxHashMap::default();
    let mut overall_start = first.start;
    for exon in exons {
        overall_start = overall_start.min(exon.start);
        group_starts
            .entry(exon.group)
            .and_modify(|s| *s = (*s).min(exon.start))
            .or_insert(exon.start);
    }

    let mut groups: Vec<(i64, C)> = group_starts.into_iter().collect();
    radsort::sort_by_key(&mut groups, |(group, _)| *group);

    groups
        .into_iter()
        .enumerate()
        .map(|(idx, (group, group_start))| Interval {
            chr: first.chr,
            strand: first.strand,
            start: overall_start,
            end: group_start - C::one(),
            group,
            idx,
        })
        .collect()
}

/// Shortened width of each group's leading span, keyed by group.
pub fn tx_start_offsets<C: Coord>(
    exons: &[Interval<C>],
    gaps: &[Gap<C>],
    target_gap_width: C,
) -> Result<FxHashMap<i64, C>> {
    let start = Instant::now();

    let tx_start_gaps = get_tx_start_gaps(exons);
    let gap_map = get_gap_map(&tx_start_gaps, gaps);
    let shortened = get_shortened_gaps(&tx_start_gaps, gaps, &gap_map, target_gap_width)?;

    let offsets: FxHashMap<i64, C> = shortened
        .into_iter()
        .map(|s| (s.interval.group, s.shortened_width))
        .collect();

    debug!(
        "computed {} transcript start offsets in {:?}",
        offsets.len(),
        start.elapsed()
    );

    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaps::get_gaps;
    use crate::rugaps_structs::{GapHit, Strand};
    use crate::sorts::build_intervals;

    fn intervals(starts: &[i64], ends: &[i64], groups: &[i64]) -> Vec<Interval<i64>> {
        let n = starts.len();
        build_intervals(&vec![0; n], &vec![Strand::Forward; n], starts, ends, groups)
    }

    fn shorten(
        candidates: &[Interval<i64>],
        gaps: &[Gap<i64>],
        target_gap_width: i64,
    ) -> Vec<ShortenedInterval<i64>> {
        let map = get_gap_map(candidates, gaps);
        get_shortened_gaps(candidates, gaps, &map, target_gap_width).unwrap()
    }

    #[test]
    fn equal_gap_is_capped() {
        let introns = intervals(&[101], &[1200], &[0]);
        let out = shorten(&introns, &[Gap { start: 101, end: 1200 }], 100);
        assert_eq!(out[0].shorten_type, ShortenType::Equal);
        assert_eq!(out[0].width, 1100);
        assert_eq!(out[0].shortened_width, 100);
    }

    #[test]
    fn equal_gap_narrower_than_target_is_kept() {
        let introns = intervals(&[101], &[150], &[0]);
        let out = shorten(&introns, &[Gap { start: 101, end: 150 }], 100);
        assert_eq!(out[0].shorten_type, ShortenType::Equal);
        assert_eq!(out[0].shortened_width, 50);
    }

    #[test]
    fn pure_within_sums_reductions_over_contained_gaps() {
        // intron spans an exon of another transcript, so it contains two gaps
        let gaps = [Gap { start: 101, end: 600 }, Gap { start: 701, end: 1000 }];
        let introns = intervals(&[101, 101], &[1000, 600], &[0, 1]);
        let out = shorten(&introns, &gaps, 100);

        assert_eq!(out[0].shorten_type, ShortenType::PureWithin);
        assert_eq!(out[0].width, 900);
        // 400 removed from the first gap, 200 from the second
        assert_eq!(out[0].shortened_width, 300);

        assert_eq!(out[1].shorten_type, ShortenType::Equal);
        assert_eq!(out[1].shortened_width, 100);
    }

    #[test]
    fn pure_within_keeps_uncovered_part() {
        let gaps = [Gap { start: 201, end: 500 }];
        let introns = intervals(&[150], &[550], &[0]);
        let out = shorten(&introns, &gaps, 100);
        assert_eq!(out[0].shorten_type, ShortenType::PureWithin);
        assert_eq!(out[0].shortened_width, 401 - 200);
    }

    #[test]
    fn unmatched_rows_keep_width() {
        let gaps = [Gap { start: 201, end: 500 }];
        let introns = intervals(&[250], &[300], &[0]);
        let out = shorten(&introns, &gaps, 10);
        assert_eq!(out[0].shorten_type, ShortenType::None);
        assert_eq!(out[0].shortened_width, out[0].width);
    }

    #[test]
    fn empty_gap_set_leaves_every_row_unshortened() {
        // overlapping exons leave no gap
        let exons = intervals(&[1, 50], &[100, 300], &[0, 1]);
        let gaps = get_gaps(&exons).unwrap();
        assert!(gaps.is_empty());

        let introns = intervals(&[101, 20, 301], &[200, 49, 900], &[0, 1, 1]);
        for s in shorten(&introns, &gaps, 10) {
            assert_eq!(s.shorten_type, ShortenType::None);
            assert_eq!(s.shortened_width, s.width);
        }
    }

    #[test]
    fn equal_takes_precedence_over_pure_within() {
        let gaps = [Gap { start: 101, end: 400 }];
        let introns = intervals(&[101], &[400], &[0]);
        let map = GapMap {
            equal: vec![GapHit {
                gap_idx: 0,
                candidate_idx: 0,
            }],
            pure_within: vec![GapHit {
                gap_idx: 0,
                candidate_idx: 0,
            }],
        };
        let out = get_shortened_gaps(&introns, &gaps, &map, 100).unwrap();
        assert_eq!(out[0].shorten_type, ShortenType::Equal);
        assert_eq!(out[0].shortened_width, 100);
    }

    #[test]
    fn shortened_width_never_exceeds_width() {
        let exons = intervals(&[1, 300, 310, 2000, 5000], &[100, 305, 900, 2100, 5001], &[0; 5]);
        let gaps = get_gaps(&exons).unwrap();
        let introns = intervals(&[101, 906, 101], &[299, 1999, 4999], &[0, 0, 1]);
        for target in [1, 5, 50, 100, 10_000] {
            for s in shorten(&introns, &gaps, target) {
                assert!(s.shortened_width <= s.width);
                assert!(s.shortened_width > 0);
            }
        }
    }

    #[test]
    fn non_positive_target_is_rejected() {
        let introns = intervals(&[101], &[200], &[0]);
        let err = get_shortened_gaps(&introns, &[], &GapMap::default(), 0).unwrap_err();
        assert!(matches!(err, GapError::InvalidInput(_)));
    }

    #[test]
    fn tx_start_gaps_span_to_first_exon() {
        let exons = intervals(&[1001, 1, 1500, 400], &[1100, 100, 1600, 500], &[2, 0, 2, 1]);
        let starts = get_tx_start_gaps(&exons);
        let spans: Vec<(i64, i64, i64)> = starts.iter().map(|s| (s.group, s.start, s.end)).collect();
        assert_eq!(spans, vec![(0, 1, 0), (1, 1, 399), (2, 1, 1000)]);
        assert_eq!(starts[0].width(), 0);
    }

    #[test]
    fn tx_start_offsets_compress_leading_gaps() {
        // transcript 0: [1,100]; transcript 1: [1001,1100]
        let exons = intervals(&[1, 1001], &[100, 1100], &[0, 1]);
        let gaps = get_gaps(&exons).unwrap();
        let offsets = tx_start_offsets(&exons, &gaps, 100).unwrap();
        assert_eq!(offsets[&0], 0);
        // 1000 leading bases, of which the 900 base gap is capped to 100
        assert_eq!(offsets[&1], 200);
    }
}
