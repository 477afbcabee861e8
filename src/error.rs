use thiserror::Error;

pub type SciportResult<T> = Result<T, SciportError>;

#[derive(Error, Debug)]
pub enum SciportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),

    #[error("Excel read error: {0}")]
    ExcelRead(String),

    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("Invalid subset: {0}")]
    Subset(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Nothing to export: {0}")]
    Empty(String),
}
