//! Engine error type

use thiserror::Error;

/// Failures a calculation can report. Input coercion never fails; only the
/// export serialization step can.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer error: {0}")]
    CsvWriter(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl<W> From<csv::IntoInnerError<W>> for CalcError {
    fn from(err: csv::IntoInnerError<W>) -> Self {
        CalcError::CsvWriter(err.error().to_string())
    }
}
