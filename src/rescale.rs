use std::time::Instant;

use log::debug;
use radsort::sort_by_key;
use rustc_hash::FxHashMap;

use crate::error::{GapError, Result};
use crate::gap_map::get_gap_map;
use crate::gaps::get_gaps;
use crate::rugaps_structs::{
    Coord, FeatureType, Interval, RescaledInterval, ShortenedInterval,
};
use crate::shorten::{check_target_gap_width, get_shortened_gaps, tx_start_offsets};

#[derive(Debug, Clone)]
struct LayoutRow<C: Coord> {
    feature: FeatureType,
    idx: usize,
    group: i64,
    start: C,
    end: C,
    width: C,
}

/// Lays exons and shortened introns out end to end.
///
/// Rows are ordered by (group, start, end) when `grouped`, else by (start, end),
/// and each row's rescaled end is the running sum of widths within its group plus
/// the group's leading offset (1 without grouping). Intron rows are widened by one
/// base on each side so they touch the neighbouring exons again.
pub fn get_rescaled_txs<C: Coord>(
    exons: &[Interval<C>],
    introns_shortened: &[ShortenedInterval<C>],
    tx_start_offsets: Option<&FxHashMap<i64, C>>,
    grouped: bool,
) -> Result<Vec<RescaledInterval<C>>> {
    let offsets = match (grouped, tx_start_offsets) {
        (true, None) => {
            return Err(GapError::InvalidInput(
                "grouping was requested but no transcript start offsets were given".to_string(),
            ))
        }
        (true, offsets) => offsets,
        (false, _) => None,
    };

    let mut rows: Vec<LayoutRow<C>> = Vec::with_capacity(exons.len() + introns_shortened.len());
    for exon in exons {
        rows.push(LayoutRow {
            feature: FeatureType::Exon,
            idx: exon.idx,
            group: exon.group,
            start: exon.start,
            end: exon.end,
            width: exon.width(),
        });
    }
    for intron in introns_shortened {
        rows.push(LayoutRow {
            feature: FeatureType::Intron,
            idx: intron.interval.idx,
            group: intron.interval.group,
            start: intron.interval.start,
            end: intron.interval.end,
            width: intron.shortened_width,
        });
    }

    sort_by_key(&mut rows, |r| r.end);
    sort_by_key(&mut rows, |r| r.start);
    if grouped {
        sort_by_key(&mut rows, |r| r.group);
    }

    let mut rescaled = Vec::with_capacity(rows.len());
    let mut current_group = rows.first().map(|r| r.group);
    let mut running_sum = C::zero();

    for row in rows {
        if grouped && current_group != Some(row.group) {
            current_group = Some(row.group);
            running_sum = C::zero();
        }
        running_sum = running_sum + row.width;

        let offset = match offsets {
            Some(offsets) => *offsets.get(&row.group).ok_or_else(|| {
                GapError::InvalidInput(format!(
                    "group {} has no transcript start offset; it has introns but no exons",
                    row.group
                ))
            })?,
            None => C::one(),
        };

        let mut end = running_sum + offset;
        let mut start = end - row.width + C::one();
        if row.feature == FeatureType::Intron {
            start = start - C::one();
            end = end + C::one();
        }

        rescaled.push(RescaledInterval {
            feature: row.feature,
            idx: row.idx,
            group: row.group,
            start,
            end,
        });
    }

    Ok(rescaled)
}

/// Runs gap detection, mapping, shortening and rescaling over encoded intervals.
///
/// Introns are expected in the abutting convention (they share their boundary
/// bases with the flanking exons) and are shrunk by one base on each side before
/// they are compared with the gaps. An intron left with no bases, i.e. one between
/// directly adjacent exons, is rejected.
pub fn shorten_gaps_intervals<C: Coord>(
    exons: &[Interval<C>],
    introns: &[Interval<C>],
    grouped: bool,
    target_gap_width: C,
) -> Result<Vec<RescaledInterval<C>>> {
    let start = Instant::now();
    check_target_gap_width(target_gap_width)?;

    let gaps = get_gaps(exons)?;

    let (chr, strand) = (exons[0].chr, exons[0].strand);
    if let Some(intron) = introns
        .iter()
        .find(|i| i.chr != chr || i.strand != strand)
    {
        return Err(GapError::InvalidInput(format!(
            "intron at row {} is not on the exons' chromosome and strand",
            intron.idx
        )));
    }

    let shrunk: Vec<Interval<C>> = introns
        .iter()
        .map(|i| Interval {
            start: i.start + C::one(),
            end: i.end - C::one(),
            ..i.clone()
        })
        .collect();
    if let Some(intron) = shrunk.iter().find(|i| i.start > i.end) {
        return Err(GapError::InvalidInput(format!(
            "intron at row {} has no bases between its flanking exons",
            intron.idx
        )));
    }

    let gap_map = get_gap_map(&shrunk, &gaps);
    let introns_shortened = get_shortened_gaps(&shrunk, &gaps, &gap_map, target_gap_width)?;

    let offsets = if grouped {
        Some(tx_start_offsets(exons, &gaps, target_gap_width)?)
    } else {
        None
    };

    let rescaled = get_rescaled_txs(exons, &introns_shortened, offsets.as_ref(), grouped)?;

    debug!(
        "rescaled {} exons and {} introns around {} gaps in {:?}",
        exons.len(),
        introns.len(),
        gaps.len(),
        start.elapsed()
    );

    Ok(rescaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rugaps_structs::Strand;
    use crate::sorts::build_intervals;

    fn intervals(starts: &[i64], ends: &[i64], groups: &[i64]) -> Vec<Interval<i64>> {
        let n = starts.len();
        build_intervals(&vec![0; n], &vec![Strand::Forward; n], starts, ends, groups)
    }

    fn spans(rescaled: &[RescaledInterval<i64>]) -> Vec<(FeatureType, i64, i64)> {
        rescaled.iter().map(|r| (r.feature, r.start, r.end)).collect()
    }

    #[test]
    fn long_intron_is_capped_with_grouping() {
        let exons = intervals(&[1, 1201], &[100, 1300], &[0, 0]);
        let introns = intervals(&[100], &[1201], &[0]);
        let out = shorten_gaps_intervals(&exons, &introns, true, 100).unwrap();
        assert_eq!(
            spans(&out),
            vec![
                (FeatureType::Exon, 1, 100),
                (FeatureType::Intron, 100, 201),
                (FeatureType::Exon, 201, 300),
            ]
        );
    }

    #[test]
    fn ungrouped_layout_starts_at_offset_one() {
        let exons = intervals(&[1, 1201], &[100, 1300], &[0, 0]);
        let introns = intervals(&[100], &[1201], &[0]);
        let out = shorten_gaps_intervals(&exons, &introns, false, 100).unwrap();
        assert_eq!(
            spans(&out),
            vec![
                (FeatureType::Exon, 2, 101),
                (FeatureType::Intron, 101, 202),
                (FeatureType::Exon, 202, 301),
            ]
        );
    }

    #[test]
    fn wide_target_leaves_genomic_layout() {
        let exons = intervals(&[1, 201, 501], &[100, 300, 600], &[0; 3]);
        let introns = intervals(&[100, 300], &[201, 501], &[0; 2]);
        let out = shorten_gaps_intervals(&exons, &introns, false, 10_000).unwrap();
        // everything is shifted by the default offset of 1 and nothing else
        for r in &out {
            let (start, end) = match r.feature {
                FeatureType::Exon => (exons[r.idx].start, exons[r.idx].end),
                FeatureType::Intron => (introns[r.idx].start, introns[r.idx].end),
            };
            assert_eq!((r.start, r.end), (start + 1, end + 1));
        }
    }

    #[test]
    fn transcripts_share_compressed_positions() {
        // a: [1,100] --- [1201,1300]; b: [601,700] --- [1201,1300]
        let exons = intervals(&[1, 1201, 601, 1201], &[100, 1300, 700, 1300], &[0, 0, 1, 1]);
        let introns = intervals(&[100, 700], &[1201, 1201], &[0, 1]);
        let out = shorten_gaps_intervals(&exons, &introns, true, 100).unwrap();
        assert_eq!(
            spans(&out),
            vec![
                (FeatureType::Exon, 1, 100),
                (FeatureType::Intron, 100, 401),
                (FeatureType::Exon, 401, 500),
                (FeatureType::Exon, 201, 300),
                (FeatureType::Intron, 300, 401),
                (FeatureType::Exon, 401, 500),
            ]
        );
        let groups: Vec<i64> = out.iter().map(|r| r.group).collect();
        assert_eq!(groups, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn rows_are_contiguous_and_ordered() {
        let exons = intervals(
            &[1, 5001, 9001, 2001, 9001],
            &[300, 5200, 9100, 2100, 9500],
            &[0, 0, 0, 1, 1],
        );
        let introns = intervals(&[300, 5200, 2100], &[5001, 9001, 9001], &[0, 0, 1]);
        let out = shorten_gaps_intervals(&exons, &introns, true, 100).unwrap();

        for group in [0, 1] {
            let rows: Vec<&RescaledInterval<i64>> =
                out.iter().filter(|r| r.group == group).collect();
            for pair in rows.windows(2) {
                // introns are widened by one base, so neighbours share a base
                assert_eq!(pair[0].end, pair[1].start);
            }
            let genomic_starts: Vec<i64> = rows
                .iter()
                .map(|r| match r.feature {
                    FeatureType::Exon => exons[r.idx].start,
                    FeatureType::Intron => introns[r.idx].start,
                })
                .collect();
            assert!(genomic_starts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn group_span_is_offset_plus_widths() {
        let exons = intervals(
            &[1, 5001, 9001, 2001, 9001],
            &[300, 5200, 9100, 2100, 9500],
            &[0, 0, 0, 1, 1],
        );
        let introns = intervals(&[300, 5200, 2100], &[5001, 9001, 9001], &[0, 0, 1]);
        let out = shorten_gaps_intervals(&exons, &introns, true, 100).unwrap();

        let gaps = get_gaps(&exons).unwrap();
        let offsets = tx_start_offsets(&exons, &gaps, 100).unwrap();
        let shrunk: Vec<Interval<i64>> = introns
            .iter()
            .map(|i| Interval {
                start: i.start + 1,
                end: i.end - 1,
                ..i.clone()
            })
            .collect();
        let shortened =
            get_shortened_gaps(&shrunk, &gaps, &get_gap_map(&shrunk, &gaps), 100).unwrap();

        for group in [0, 1] {
            let exon_widths: i64 = exons
                .iter()
                .filter(|e| e.group == group)
                .map(|e| e.width())
                .sum();
            let intron_widths: i64 = shortened
                .iter()
                .filter(|s| s.interval.group == group)
                .map(|s| s.shortened_width)
                .sum();
            let last = out.iter().filter(|r| r.group == group).last().unwrap();
            let last_end = match last.feature {
                FeatureType::Exon => last.end,
                FeatureType::Intron => last.end - 1,
            };
            assert_eq!(exon_widths + intron_widths + offsets[&group], last_end);
        }
        // first exon, then the 300 bases left of the first intron, then 200 exon bases
        assert_eq!(out[2].end, 800);
    }

    #[test]
    fn intron_between_adjacent_exons_is_rejected() {
        let exons = intervals(&[1, 101], &[100, 200], &[0, 0]);
        let introns = intervals(&[100], &[101], &[0]);
        let err = shorten_gaps_intervals(&exons, &introns, true, 100).unwrap_err();
        assert!(matches!(err, GapError::InvalidInput(_)));
    }

    #[test]
    fn one_base_intron_is_kept() {
        let exons = intervals(&[1, 102], &[100, 200], &[0, 0]);
        let introns = intervals(&[100], &[102], &[0]);
        let out = shorten_gaps_intervals(&exons, &introns, true, 100).unwrap();
        assert_eq!(
            spans(&out),
            vec![
                (FeatureType::Exon, 1, 100),
                (FeatureType::Intron, 100, 102),
                (FeatureType::Exon, 102, 200),
            ]
        );
    }

    #[test]
    fn single_exon_without_introns() {
        let exons = intervals(&[10], &[50], &[0]);
        let out = shorten_gaps_intervals(&exons, &[], true, 100).unwrap();
        assert_eq!(spans(&out), vec![(FeatureType::Exon, 1, 41)]);
    }

    #[test]
    fn grouping_without_offsets_is_rejected() {
        let exons = intervals(&[1], &[100], &[0]);
        let err = get_rescaled_txs(&exons, &[], None, true).unwrap_err();
        assert!(matches!(err, GapError::InvalidInput(_)));
    }

    #[test]
    fn intron_group_without_exons_is_rejected() {
        let exons = intervals(&[1, 1201], &[100, 1300], &[0, 0]);
        let introns = intervals(&[100], &[1201], &[7]);
        let err = shorten_gaps_intervals(&exons, &introns, true, 100).unwrap_err();
        assert!(matches!(err, GapError::InvalidInput(_)));
    }

    #[test]
    fn introns_on_other_strand_are_rejected() {
        let exons = intervals(&[1, 1201], &[100, 1300], &[0, 0]);
        let mut introns = intervals(&[100], &[1201], &[0]);
        introns[0].strand = Strand::Reverse;
        let err = shorten_gaps_intervals(&exons, &introns, false, 100).unwrap_err();
        assert!(matches!(err, GapError::InvalidInput(_)));
    }
}
