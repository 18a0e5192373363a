use thiserror::Error;

use super::model::Field;

/// Errors raised by the data layer: loading, querying and chart preparation.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Aggregation needs at least one grouping field")]
    EmptyGrouping,

    #[error("Filter dependencies form a cycle among {0:?}")]
    CascadeCycle(Vec<Field>),

    #[error("'{0}' is not one of the page's filter controls")]
    UnregisteredControl(Field),

    #[error("'{0}' is not a grouping field of the summary")]
    NotGrouped(Field),
}

pub type DataResult<T> = Result<T, DataError>;
