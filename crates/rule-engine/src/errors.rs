use hotwork_core_types::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule file not found: {path}")]
    NotFound { path: String },
    #[error("io error reading {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid rule file: {0}")]
    Invalid(String),
    #[error("invalid value at {path}: {message}")]
    InvalidValue { path: String, message: String },
    #[error("invalid pattern for {key}: {message}")]
    InvalidPattern { key: String, message: String },
    #[error("invalid catalogue: {0}")]
    InvalidCatalogue(String),
}

impl From<CoreError> for RuleError {
    fn from(value: CoreError) -> Self {
        RuleError::Invalid(value.to_string())
    }
}
