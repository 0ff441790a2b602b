use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Clipboard initialization failed: {0}")]
    ClipboardInitError(String),

    #[error("Clipboard read failed: {0}")]
    ClipboardReadError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardWriteError(String),

    #[error("Storage read failed: {0}")]
    StorageReadError(String),

    #[error("Storage write failed: {0}")]
    StorageWriteError(String),

    #[error("Serialization failed: {0}")]
    SerializationError(String),

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("AI processing error: {0}")]
    AIError(String),
}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        HistoryError::IoError(err.to_string())
    }
}
