use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("No coverage trace data found under '{0}'")]
    NoTraceData(String),

    #[error("Coverage capture failed: {0}")]
    CaptureFailed(String),

    #[error("Missing token: {0} is not set")]
    MissingToken(&'static str),

    #[error("Upload to {backend} failed: {reason}")]
    Upload { backend: String, reason: String },
}

