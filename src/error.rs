use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlsError>;

/// Fatal load-time problems with the sheet layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("required columns missing: {missing:?}; every sheet must provide {required:?}")]
    MissingFields {
        missing: Vec<&'static str>,
        required: Vec<&'static str>,
    },

    #[error("workbook contains no worksheets")]
    NoSheets,

    #[error("sheet has no header row")]
    EmptySheet,
}

#[derive(Error, Debug)]
pub enum ExportError {
    // Raised when the crate is built without the `pdf` feature. Callers
    // treat it as "export disabled", not as a failure of the view.
    #[error("document export is not available in this build")]
    Unavailable,

    #[error("spreadsheet export failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("document export failed: {0}")]
    Document(String),
}

#[derive(Error, Debug)]
pub enum SlsError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported input format: {0:?} (expected .xlsx or .csv)")]
    UnsupportedFormat(PathBuf),

    #[error("input file not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("no data loaded")]
    NotLoaded,
}
