use thiserror::Error;

/// Errors produced while loading or querying the nutrition dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset source not found: {0}")]
    NotFound(String),

    #[error("Missing required column: {0}")]
    Schema(String),

    #[error("No data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Malformed dataset: {0}")]
    Malformed(String),

    #[error("Blob download failed: {0}")]
    Download(String),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        DatasetError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DatasetError::NotFound(_) => "not_found",
            DatasetError::Schema(_) => "schema",
            DatasetError::EmptyData(_) => "empty_data",
            DatasetError::InvalidParameter { .. } => "invalid_parameter",
            DatasetError::Malformed(_) => "malformed",
            DatasetError::Download(_) => "download",
            DatasetError::Snapshot(_) => "snapshot",
            DatasetError::Io(_) => "io",
        }
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        DatasetError::Malformed(err.to_string())
    }
}

pub type DatasetResult<T> = std::result::Result<T, DatasetError>;
