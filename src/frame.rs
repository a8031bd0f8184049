//! Table layer: validates and encodes polars frames, runs the interval pipeline
//! and turns the result back into a frame.

use std::time::Instant;

use log::debug;
use polars::prelude::*;
use rustc_hash::FxHashMap;

use crate::error::{GapError, Result};
use crate::introns;
use crate::rescale::shorten_gaps_intervals;
use crate::rugaps_structs::{FeatureType, Interval, Strand};
use crate::sorts::build_intervals;

/// Columns every exon and intron table must carry, in output order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["seqnames", "start", "end", "strand"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Exons,
    Introns,
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Exons => "exons",
            TableKind::Introns => "introns",
        }
    }

    pub fn feature(&self) -> FeatureType {
        match self {
            TableKind::Exons => FeatureType::Exon,
            TableKind::Introns => FeatureType::Intron,
        }
    }
}

/// Fails with a schema error listing every required or grouping column `df` lacks.
pub fn check_columns(df: &DataFrame, kind: TableKind, group_by: &[&str]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .chain(group_by.iter())
        .filter(|name| df.get_column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GapError::schema(kind.name(), missing))
    }
}

/// Makes sure every row carries a `type`.
///
/// A missing column is filled with `exon` or `intron`. An intron table that already
/// has one must say `intron` on every row.
pub fn get_type(df: &DataFrame, kind: TableKind) -> Result<DataFrame> {
    let mut df = df.clone();

    if df.get_column_index("type").is_none() {
        let types = Series::new("type".into(), vec![kind.feature().as_str(); df.height()]);
        df.with_column(types)?;
    } else if kind == TableKind::Introns {
        let types = df.column("type")?.cast(&DataType::String)?;
        let all_introns = types
            .str()?
            .into_iter()
            .all(|t| t == Some(FeatureType::Intron.as_str()));
        if !all_introns {
            return Err(GapError::InvalidInput(
                "all 'type' values in the introns table must be 'intron'".to_string(),
            ));
        }
    }

    Ok(df)
}

fn null_error(kind: TableKind, column: &str, row: usize) -> GapError {
    GapError::InvalidInput(format!(
        "{} table has a null '{}' at row {}",
        kind.name(),
        column,
        row
    ))
}

/// Encodes a string-like column as dense codes, sharing `global_map` between tables
/// so the same name gets the same code everywhere.
fn encode_strings_to_codes(
    df: &DataFrame,
    kind: TableKind,
    column: &str,
    global_map: &mut FxHashMap<String, i64>,
) -> Result<Vec<i64>> {
    let values = df.column(column)?.cast(&DataType::String)?;

    values
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.ok_or_else(|| null_error(kind, column, row))?;
            let next_code = global_map.len() as i64;
            Ok(*global_map.entry(value.to_string()).or_insert(next_code))
        })
        .collect()
}

fn strands(df: &DataFrame, kind: TableKind) -> Result<Vec<Strand>> {
    let values = df.column("strand")?.cast(&DataType::String)?;

    values
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| null_error(kind, "strand", row))?.parse())
        .collect()
}

fn coordinates(df: &DataFrame, kind: TableKind, column: &str) -> Result<Vec<i64>> {
    let values = df.column(column)?.cast(&DataType::Int64)?;

    values
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| null_error(kind, column, row)))
        .collect()
}

const ROW_COLUMN: &str = "__rugaps_row";

/// Type a grouping column is compared in when it comes from several tables.
///
/// Integers compare as `Int64` and mixed numbers as `Float64`. Categoricals and
/// mismatched types compare as strings.
fn group_key_dtype(dtypes: &[DataType]) -> DataType {
    if dtypes.iter().all(|d| d.is_integer()) {
        DataType::Int64
    } else if dtypes.iter().all(|d| d.is_integer() || d.is_float()) {
        DataType::Float64
    } else if dtypes.iter().all(|d| d == &dtypes[0])
        && !matches!(dtypes[0], DataType::Categorical(..) | DataType::Enum(..))
    {
        dtypes[0].clone()
    } else {
        DataType::String
    }
}

/// Codes for the group keys of several tables. Codes follow the sorted key
/// order, each column sorted by its own type, so sorting by code sorts groups
/// the way sorting by the grouping columns would.
fn encode_groups(frames: &[&DataFrame], group_by: &[&str]) -> Result<Vec<Vec<i64>>> {
    if group_by.is_empty() {
        return Ok(frames.iter().map(|df| vec![0; df.height()]).collect());
    }

    let mut keys = frames
        .iter()
        .map(|df| df.select(group_by.iter().copied()))
        .collect::<PolarsResult<Vec<DataFrame>>>()?;
    for &name in group_by {
        let dtypes = keys
            .iter()
            .map(|k| k.column(name).map(|c| c.dtype().clone()))
            .collect::<PolarsResult<Vec<DataType>>>()?;
        let dtype = group_key_dtype(&dtypes);
        for k in keys.iter_mut() {
            let column = k.column(name)?.strict_cast(&dtype)?;
            k.with_column(column)?;
        }
    }

    let Some((first, rest)) = keys.split_first() else {
        return Ok(Vec::new());
    };
    let mut stacked = first.clone();
    for k in rest {
        stacked.vstack_mut(k)?;
    }
    let total = stacked.height();
    stacked.with_column(Series::new(
        ROW_COLUMN.into(),
        (0..total as i64).collect::<Vec<i64>>(),
    ))?;

    let sorted = stacked.sort(
        group_by.to_vec(),
        SortMultipleOptions::default().with_maintain_order(true),
    )?;
    let rows = sorted.column(ROW_COLUMN)?.i64()?;
    let key_columns = group_by
        .iter()
        .map(|name| sorted.column(name))
        .collect::<PolarsResult<Vec<&Column>>>()?;

    let mut codes = vec![0i64; total];
    let mut code = -1;
    let mut previous: Option<Vec<AnyValue>> = None;
    for (i, row) in rows.into_no_null_iter().enumerate() {
        let key = key_columns
            .iter()
            .map(|c| c.get(i))
            .collect::<PolarsResult<Vec<AnyValue>>>()?;
        if previous.as_ref() != Some(&key) {
            code += 1;
            previous = Some(key);
        }
        codes[row as usize] = code;
    }

    let mut offset = 0;
    Ok(keys
        .iter()
        .map(|k| {
            let frame_codes = codes[offset..offset + k.height()].to_vec();
            offset += k.height();
            frame_codes
        })
        .collect())
}

fn to_intervals(
    df: &DataFrame,
    kind: TableKind,
    chr_map: &mut FxHashMap<String, i64>,
    groups: &[i64],
) -> Result<Vec<Interval<i64>>> {
    let chrs = encode_strings_to_codes(df, kind, "seqnames", chr_map)?;
    let strands = strands(df, kind)?;
    let starts = coordinates(df, kind, "start")?;
    let ends = coordinates(df, kind, "end")?;

    Ok(build_intervals(&chrs, &strands, &starts, &ends, groups))
}

/// Casts the positional and label columns to the types the output uses.
fn normalize_types(df: &DataFrame) -> Result<DataFrame> {
    let mut df = df.clone();
    for (name, dtype) in [
        ("seqnames", DataType::String),
        ("strand", DataType::String),
        ("type", DataType::String),
        ("start", DataType::Int64),
        ("end", DataType::Int64),
    ] {
        let column = df.column(name)?.cast(&dtype)?;
        df.with_column(column)?;
    }
    Ok(df)
}

/// Brings two frames to the same column set and order so they can be stacked.
///
/// Columns found only in one frame are filled with nulls in the other; shared
/// columns take the exon frame's type, and intron values that do not fit it are
/// an error rather than nulls.
fn align_columns(exons: &DataFrame, introns: &DataFrame) -> Result<(DataFrame, DataFrame)> {
    let mut names: Vec<PlSmallStr> = exons.get_column_names().into_iter().cloned().collect();
    for name in introns.get_column_names() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    let fill = |df: &DataFrame, other: &DataFrame| -> Result<DataFrame> {
        let mut df = df.clone();
        for name in &names {
            if df.get_column_index(name).is_some() {
                continue;
            }
            let dtype = other.column(name)?.dtype().clone();
            df.with_column(Series::full_null(name.clone(), df.height(), &dtype))?;
        }
        Ok(df.select(names.iter().cloned())?)
    };

    let exons = fill(exons, introns)?;
    let mut introns = fill(introns, &exons)?;

    for name in &names {
        let dtype = exons.column(name)?.dtype().clone();
        if introns.column(name)?.dtype() != &dtype {
            let column = introns.column(name)?.strict_cast(&dtype).map_err(|_| {
                GapError::InvalidInput(format!(
                    "column '{}' is {} in the exons table but the introns table holds values \
                     that cannot be cast to it",
                    name, dtype
                ))
            })?;
            introns.with_column(column)?;
        }
    }

    Ok((exons, introns))
}

fn reorder_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut order: Vec<PlSmallStr> = REQUIRED_COLUMNS.iter().map(|&c| c.into()).collect();
    for name in df.get_column_names() {
        if !order.contains(name) {
            order.push(name.clone());
        }
    }
    Ok(df.select(order)?)
}

/// Rescales exon and intron coordinates so that long gaps are drawn at
/// `target_gap_width`.
///
/// Both frames need `seqnames`, `start`, `end` and `strand`, all on a single
/// chromosome and strand. Introns use the abutting convention: an intron starts at
/// its left exon's end and ends at its right exon's start.
///
/// With `group_by` (one or more columns, e.g. `transcript_id`), each group is laid
/// out on its own and shifted by the shortened distance from the leftmost exon of
/// the input to the group's first exon. Without it, all rows form one layout that
/// starts at offset 1.
///
/// The output has `seqnames`, `start`, `end`, `strand` first (in rescaled
/// coordinates) followed by every other input column, ordered by group and
/// genomic position.
pub fn shorten_gaps(
    exons: &DataFrame,
    introns: &DataFrame,
    group_by: Option<&[&str]>,
    target_gap_width: i64,
) -> Result<DataFrame> {
    let start = Instant::now();
    let group_by = group_by.unwrap_or(&[]);
    let grouped = !group_by.is_empty();

    check_columns(exons, TableKind::Exons, group_by)?;
    check_columns(introns, TableKind::Introns, group_by)?;

    let exons = normalize_types(&get_type(exons, TableKind::Exons)?)?;
    let introns = normalize_types(&get_type(introns, TableKind::Introns)?)?;

    let groups = encode_groups(&[&exons, &introns], group_by)?;
    let (exon_groups, intron_groups) = (&groups[0], &groups[1]);
    let mut chr_map: FxHashMap<String, i64> = FxHashMap::default();
    let exon_intervals = to_intervals(&exons, TableKind::Exons, &mut chr_map, exon_groups)?;
    let intron_intervals =
        to_intervals(&introns, TableKind::Introns, &mut chr_map, intron_groups)?;

    let rescaled =
        shorten_gaps_intervals(&exon_intervals, &intron_intervals, grouped, target_gap_width)?;

    let (exons, introns) = align_columns(&exons, &introns)?;
    let n_exons = exons.height();
    let stacked = exons.vstack(&introns)?;

    let mut take_idx: Vec<IdxSize> = Vec::with_capacity(rescaled.len());
    let mut starts: Vec<i64> = Vec::with_capacity(rescaled.len());
    let mut ends: Vec<i64> = Vec::with_capacity(rescaled.len());
    for r in &rescaled {
        let row = match r.feature {
            FeatureType::Exon => r.idx,
            FeatureType::Intron => n_exons + r.idx,
        };
        take_idx.push(row as IdxSize);
        starts.push(r.start);
        ends.push(r.end);
    }

    let mut out = stacked.take(&IdxCa::from_vec("idx".into(), take_idx))?;
    out.with_column(Series::new("start".into(), starts))?;
    out.with_column(Series::new("end".into(), ends))?;
    let out = reorder_columns(&out)?;

    debug!(
        "shorten_gaps produced {} rows in {:?}",
        out.height(),
        start.elapsed()
    );

    Ok(out)
}

/// Derives the introns of each group from its exons.
///
/// Returns `seqnames`, `start`, `end`, `strand`, the grouping columns and
/// `type = "intron"`, one row per pair of consecutive exons with at least one base
/// between them.
pub fn to_introns(exons: &DataFrame, group_by: &[&str]) -> Result<DataFrame> {
    check_columns(exons, TableKind::Exons, group_by)?;

    let groups = encode_groups(&[exons], group_by)?;
    let mut chr_map: FxHashMap<String, i64> = FxHashMap::default();
    let exon_intervals = to_intervals(exons, TableKind::Exons, &mut chr_map, &groups[0])?;

    let introns = introns::to_introns(&exon_intervals);

    let mut columns: Vec<PlSmallStr> = REQUIRED_COLUMNS.iter().map(|&c| c.into()).collect();
    for &name in group_by {
        if !REQUIRED_COLUMNS.contains(&name) {
            columns.push(name.into());
        }
    }

    let take_idx: Vec<IdxSize> = introns.iter().map(|i| i.idx as IdxSize).collect();
    let starts: Vec<i64> = introns.iter().map(|i| i.start).collect();
    let ends: Vec<i64> = introns.iter().map(|i| i.end).collect();

    let mut out = exons
        .select(columns)?
        .take(&IdxCa::from_vec("idx".into(), take_idx))?;
    out.with_column(Series::new("start".into(), starts))?;
    out.with_column(Series::new("end".into(), ends))?;
    out.with_column(Series::new(
        "type".into(),
        vec![FeatureType::Intron.as_str(); introns.len()],
    ))?;

    Ok(out)
}
