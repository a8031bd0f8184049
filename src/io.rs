use std::fs::File;
use std::io::Write;
use std::path::Path;

use polars::prelude::*;

use crate::error::Result;

/// Reads a delimited table with a header row.
///
/// `seqnames` is read as a categorical, the way annotation tables usually come in;
/// the table layer casts it back to strings.
pub fn read_table(path: &Path, separator: u8) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default().with_separator(separator);
    let schema = Schema::from_iter(vec![Field::new(
        "seqnames".into(),
        DataType::Categorical(None, CategoricalOrdering::Physical),
    )]);

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(Arc::new(schema)))
        .with_rechunk(true)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

pub fn write_table<W: Write>(df: &mut DataFrame, writer: W, separator: u8) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(separator)
        .finish(df)?;
    Ok(())
}

pub fn write_table_to_path(df: &mut DataFrame, path: &Path, separator: u8) -> Result<()> {
    let file = File::create(path)?;
    write_table(df, std::io::BufWriter::new(file), separator)
}
