use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::gaps::get_gaps;
use crate::rescale::shorten_gaps_intervals;
use crate::rugaps_structs::{FeatureType, Strand};
use crate::sorts::try_build_intervals;

fn strands_from_flags(strand_flags: &[bool]) -> Vec<Strand> {
    strand_flags
        .iter()
        .map(|&forward| if forward { Strand::Forward } else { Strand::Reverse })
        .collect()
}

#[pyfunction]
pub fn gaps_numpy(
    chrs: PyReadonlyArray1<i64>,
    strand_flags: PyReadonlyArray1<bool>,
    starts: PyReadonlyArray1<i64>,
    ends: PyReadonlyArray1<i64>,
    py: Python,
) -> PyResult<(Py<PyArray1<i64>>, Py<PyArray1<i64>>)> {
    let chrs_slice = chrs.as_slice()?;
    let strands = strands_from_flags(strand_flags.as_slice()?);
    let groups = vec![0; chrs_slice.len()];

    let exons = try_build_intervals(chrs_slice, &strands, starts.as_slice()?, ends.as_slice()?, &groups)?;
    let gaps = get_gaps(&exons)?;

    let (gap_starts, gap_ends): (Vec<i64>, Vec<i64>) = gaps.iter().map(|g| (g.start, g.end)).unzip();
    Ok((
        gap_starts.into_pyarray(py).to_owned().into(),
        gap_ends.into_pyarray(py).to_owned().into(),
    ))
}

/// Returns `(is_intron, idxs, starts, ends)` in output order; `idxs` index into the
/// exon arrays or the intron arrays depending on `is_intron`.
#[pyfunction]
#[pyo3(signature = (chrs, strand_flags, starts, ends, groups, chrs2, strand_flags2, starts2, ends2, groups2, target_gap_width=100, grouped=false))]
pub fn shorten_gaps_numpy(
    chrs: PyReadonlyArray1<i64>,
    strand_flags: PyReadonlyArray1<bool>,
    starts: PyReadonlyArray1<i64>,
    ends: PyReadonlyArray1<i64>,
    groups: PyReadonlyArray1<i64>,
    chrs2: PyReadonlyArray1<i64>,
    strand_flags2: PyReadonlyArray1<bool>,
    starts2: PyReadonlyArray1<i64>,
    ends2: PyReadonlyArray1<i64>,
    groups2: PyReadonlyArray1<i64>,
    target_gap_width: i64,
    grouped: bool,
    py: Python,
) -> PyResult<(
    Py<PyArray1<bool>>,
    Py<PyArray1<i64>>,
    Py<PyArray1<i64>>,
    Py<PyArray1<i64>>,
)> {
    let exons = try_build_intervals(
        chrs.as_slice()?,
        &strands_from_flags(strand_flags.as_slice()?),
        starts.as_slice()?,
        ends.as_slice()?,
        groups.as_slice()?,
    )?;
    let introns = try_build_intervals(
        chrs2.as_slice()?,
        &strands_from_flags(strand_flags2.as_slice()?),
        starts2.as_slice()?,
        ends2.as_slice()?,
        groups2.as_slice()?,
    )?;

    let rescaled = shorten_gaps_intervals(&exons, &introns, grouped, target_gap_width)?;

    let is_intron: Vec<bool> = rescaled.iter().map(|r| r.feature == FeatureType::Intron).collect();
    let idxs: Vec<i64> = rescaled.iter().map(|r| r.idx as i64).collect();
    let out_starts: Vec<i64> = rescaled.iter().map(|r| r.start).collect();
    let out_ends: Vec<i64> = rescaled.iter().map(|r| r.end).collect();

    Ok((
        is_intron.into_pyarray(py).to_owned().into(),
        idxs.into_pyarray(py).to_owned().into(),
        out_starts.into_pyarray(py).to_owned().into(),
        out_ends.into_pyarray(py).to_owned().into(),
    ))
}

#[pymodule]
fn rugaps(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(gaps_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(shorten_gaps_numpy, m)?)?;
    Ok(())
}
