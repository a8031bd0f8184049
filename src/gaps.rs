use std::time::Instant;

use log::debug;
use rustc_hash::FxHashSet;

use crate::error::{GapError, Result};
use crate::rugaps_structs::{Coord, Gap, Interval};
use crate::sorts;

/// Merges overlapping exons into blocks, sorted by start.
///
/// Two exons belong to the same block when the next one starts at or before the
/// current block end. Adjacent exons (`next.start == end + 1`) stay separate blocks.
pub fn merge_blocks<C: Coord>(exons: &[Interval<C>]) -> Vec<Gap<C>> {
    let mut blocks = Vec::new();
    if exons.is_empty() {
        return blocks;
    }

    let mut sorted = exons.to_vec();
    sorts::sort_by_position(&mut sorted);

    let mut current_start = sorted[0].start;
    let mut current_end = sorted[0].end;

    for exon in &sorted[1..] {
        if exon.start > current_end {
            blocks.push(Gap {
                start: current_start,
                end: current_end,
            });
            current_start = exon.start;
            current_end = exon.end;
        } else {
            current_end = current_end.max(exon.end);
        }
    }

    blocks.push(Gap {
        start: current_start,
        end: current_end,
    });

    blocks
}

/// Finds the regions between merged exon blocks.
///
/// All exons must come from one chromosome and one strand; at least one exon is
/// needed to know which.
pub fn get_gaps<C: Coord>(exons: &[Interval<C>]) -> Result<Vec<Gap<C>>> {
    let start = Instant::now();

    if exons.is_empty() {
        return Err(GapError::DegenerateInput(
            "at least one exon is required to find gaps".to_string(),
        ));
    }

    let chrs: FxHashSet<i64> = exons.iter().map(|e| e.chr).collect();
    let strands: FxHashSet<_> = exons.iter().map(|e| e.strand).collect();
    if chrs.len() != 1 || strands.len() != 1 {
        return Err(GapError::InvalidInput(format!(
            "exons must be from a single chromosome and strand, found {} chromosome(s) and {} strand(s)",
            chrs.len(),
            strands.len()
        )));
    }

    let blocks = merge_blocks(exons);
    let gaps: Vec<Gap<C>> = blocks
        .windows(2)
        .filter_map(|pair| {
            let gap = Gap {
                start: pair[0].end + C::one(),
                end: pair[1].start - C::one(),
            };
            (gap.start <= gap.end).then_some(gap)
        })
        .collect();

    debug!(
        "found {} gaps between {} merged blocks in {:?}",
        gaps.len(),
        blocks.len(),
        start.elapsed()
    );

    Ok(gaps)
}
