use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClipScoutError>;

#[derive(Error, Debug)]
pub enum ClipScoutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source fetch failed ({platform}): {message}")]
    SourceFetch { platform: String, message: String },

    #[error("Model call failed: {0}")]
    ModelCall(String),

    #[error("Model response could not be decoded: {0}")]
    ModelResponse(String),

    #[error("Cache access error: {0}")]
    CacheAccess(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for ClipScoutError {
    fn from(err: serde_json::Error) -> Self {
        ClipScoutError::ModelResponse(err.to_string())
    }
}
