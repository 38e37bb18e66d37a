use thiserror::Error;

pub type HeliosResult<T> = Result<T, HeliosError>;

#[derive(Error, Debug)]
pub enum HeliosError {
    /// A required source table is missing or unreadable. Fatal to the session.
    #[error("Data unavailable ({table}): {reason}")]
    DataUnavailable { table: String, reason: String },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HeliosError {
    pub fn data_unavailable(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error must abort the whole session rather than a single
    /// recomputation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidSelection(_))
    }
}

impl From<config::ConfigError> for HeliosError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
