use thiserror::Error;

pub type MrfResult<T> = Result<T, MrfError>;

#[derive(Error, Debug)]
pub enum MrfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Sheet '{sheet}' not found in {workbook}")]
    MissingSheet { workbook: String, sheet: String },

    #[error("Cell {sheet}!{cell} is missing or empty")]
    MissingCell { sheet: String, cell: String },

    #[error("Malformed reference in {location}: expected {expected}, found {found:?}")]
    MalformedReference {
        location: String,
        expected: &'static str,
        found: String,
    },

    #[error("Unknown named region '{0}'")]
    UnknownName(String),

    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl MrfError {
    /// Structural errors come from a single malformed input file. These are the
    /// ones the skip policy may swallow; I/O and export failures never are.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            MrfError::Workbook(_)
                | MrfError::MissingSheet { .. }
                | MrfError::MissingCell { .. }
                | MrfError::MalformedReference { .. }
                | MrfError::UnknownName(_)
                | MrfError::InvalidAddress(_)
        )
    }
}

impl From<calamine::Error> for MrfError {
    fn from(e: calamine::Error) -> Self {
        MrfError::Workbook(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for MrfError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        MrfError::Export(e.to_string())
    }
}
