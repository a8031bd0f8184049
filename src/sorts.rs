use radsort::sort_by_key;

use crate::error::{GapError, Result};
use crate::rugaps_structs::{Coord, Interval, Strand};

pub fn build_intervals<C: Coord>(
    chrs: &[i64],
    strands: &[Strand],
    starts: &[C],
    ends: &[C],
    groups: &[i64],
) -> Vec<Interval<C>> {
    let mut intervals: Vec<Interval<C>> = Vec::with_capacity(chrs.len());
    for i in 0..chrs.len() {
        intervals.push(Interval {
            chr: chrs[i],
            strand: strands[i],
            start: starts[i],
            end: ends[i],
            group: groups[i],
            idx: i,
        });
    }

    intervals
}

/// Like [`build_intervals`], for slices that come from outside the crate and may
/// disagree in length.
pub fn try_build_intervals<C: Coord>(
    chrs: &[i64],
    strands: &[Strand],
    starts: &[C],
    ends: &[C],
    groups: &[i64],
) -> Result<Vec<Interval<C>>> {
    let lengths = [
        ("strands", strands.len()),
        ("starts", starts.len()),
        ("ends", ends.len()),
        ("groups", groups.len()),
    ];
    if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != chrs.len()) {
        return Err(GapError::InvalidInput(format!(
            "{} has {} values but chrs has {}",
            name,
            len,
            chrs.len()
        )));
    }
    Ok(build_intervals(chrs, strands, starts, ends, groups))
}

/// Sorts by (start, end). radsort is stable, so the least significant key goes first.
pub fn sort_by_position<C: Coord>(intervals: &mut [Interval<C>]) {
    sort_by_key(intervals, |i| i.end);
    sort_by_key(intervals, |i| i.start);
}

/// Sorts by (group, start, end).
pub fn sort_by_group_position<C: Coord>(intervals: &mut [Interval<C>]) {
    sort_by_key(intervals, |i| i.end);
    sort_by_key(intervals, |i| i.start);
    sort_by_key(intervals, |i| i.group);
}

pub fn build_sorted_intervals<C: Coord>(
    chrs: &[i64],
    strands: &[Strand],
    starts: &[C],
    ends: &[C],
    groups: &[i64],
) -> Vec<Interval<C>> {
    let mut intervals = build_intervals(chrs, strands, starts, ends, groups);
    sort_by_group_position(&mut intervals);
    intervals
}
