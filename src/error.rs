use thiserror::Error;

#[derive(Error, Debug)]
pub enum BleepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Audio extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    #[error("No free file id left after {attempts} attempts (capacity {capacity})")]
    AllocationExhausted { attempts: u32, capacity: u64 },

    #[error("Speech processing error: {0}")]
    Processing(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl BleepError {
    pub fn extraction<S: Into<String>>(reason: S) -> Self {
        BleepError::ExtractionFailed {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BleepError>;
