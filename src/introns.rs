use crate::rugaps_structs::{Coord, Interval};
use crate::sorts;

/// Introns between consecutive exons of each group.
///
/// Exons are walked in (group, start, end) order. An intron runs from one exon's
/// end to the next exon's start, so it shares a base with each neighbour; pairs
/// that touch or overlap produce no intron. `idx` of each intron is the `idx` of
/// the exon on its left.
pub fn to_introns<C: Coord>(exons: &[Interval<C>]) -> Vec<Interval<C>> {
    let mut sorted = exons.to_vec();
    sorts::sort_by_group_position(&mut sorted);

    sorted
        .windows(2)
        .filter(|pair| {
            pair[0].group == pair[1].group
                && pair[0].chr == pair[1].chr
                && pair[1].start > pair[0].end + C::one()
        })
        .map(|pair| Interval {
            start: pair[0].end,
            end: pair[1].start,
            ..pair[0].clone()
        })
        .collect()
}
