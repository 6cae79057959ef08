use std::io;
use std::path::PathBuf;

/// Which of the two source datasets an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Issuances,
    Cancellations,
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dataset::Issuances => write!(f, "issuances"),
            Dataset::Cancellations => write!(f, "cancellations"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Source file missing or unreadable. Fatal: nothing can be reported.
    #[error("{dataset} source {path:?} is missing or unreadable: {source}")]
    SourceNotFound {
        dataset: Dataset,
        path: PathBuf,
        source: io::Error,
    },

    /// A date or numeric cell that cannot be parsed. Fatal for the dataset;
    /// values are never silently coerced to zero or an empty date.
    #[error("{dataset} row {row}: cannot parse {column} value {value:?}")]
    Parse {
        dataset: Dataset,
        column: String,
        row: usize,
        value: String,
    },

    /// A column the pipeline cannot run without (date, issued quantity).
    /// Absent category columns are reported via `LoadReport` instead so the
    /// rest of the report still renders.
    #[error("{dataset} file has no {column:?} column")]
    MissingColumn { dataset: Dataset, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
