//! Error types for rugaps.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GapError {
    /// Required columns are missing from an input table.
    #[error("{table} table is missing required column(s): {}", columns.join(", "))]
    Schema { table: String, columns: Vec<String> },

    /// A structural precondition does not hold.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Not enough rows to establish chromosome/strand context.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GapError {
    pub(crate) fn schema(table: &str, columns: Vec<String>) -> Self {
        GapError::Schema {
            table: table.to_string(),
            columns,
        }
    }
}

pub type Result<T> = std::result::Result<T, GapError>;

#[cfg(feature = "python")]
impl From<GapError> for pyo3::PyErr {
    fn from(err: GapError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
