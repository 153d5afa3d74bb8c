use thiserror::Error;

/// Reasons an uploaded file could not become a dataset
///
/// None of these are fatal: the upload handler reports them back to the page
/// and leaves the previously loaded dataset in place.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The filename carried no extension at all
    #[error("file has no extension")]
    NoExtension,

    /// The extension is not one of the CSV or workbook formats
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// The upload body was empty
    #[error("no file data received")]
    Empty,

    /// The file has no header row to validate
    #[error("file has no header row")]
    MissingHeader,

    /// One or more of the required columns is absent from the header row
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV decode failed: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook could not be opened or its first sheet read
    #[error("workbook decode failed: {0}")]
    Workbook(String),
}

/// Failures while moving a dataset through its serialized JSON form
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset blob is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while writing the filtered view out as a file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export buffer could not be finalised: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "web")]
    #[error("XLSX export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
