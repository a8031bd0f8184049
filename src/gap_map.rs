use crate::rugaps_structs::{Coord, Gap, GapHit, GapMap, Interval};

/// Classifies every (gap, candidate) pair.
///
/// - `equal`: the candidate has exactly the gap's start and end
/// - `pure_within`: the candidate contains the gap, and the pair is not `equal`
///
/// Candidates are introns or transcript-start gaps. This is a plain nested loop;
/// per-gene inputs are small enough that an index does not pay for itself.
pub fn get_gap_map<C: Coord>(candidates: &[Interval<C>], gaps: &[Gap<C>]) -> GapMap {
    let mut map = GapMap::default();

    for (gap_idx, gap) in gaps.iter().enumerate() {
        for (candidate_idx, candidate) in candidates.iter().enumerate() {
            let hit = GapHit {
                gap_idx,
                candidate_idx,
            };
            if gap.start == candidate.start && gap.end == candidate.end {
                map.equal.push(hit);
            } else if gap.start >= candidate.start && gap.end <= candidate.end {
                map.pure_within.push(hit);
            }
        }
    }

    map
}
