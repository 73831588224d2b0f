use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request body or persisted document is not the JSON shape we expect.
    #[error("parse error: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("store operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
