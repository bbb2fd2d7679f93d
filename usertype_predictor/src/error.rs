use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("feature schema mismatch: expected {expected:?}, artifact declares {declared:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        declared: Vec<String>,
    },

    #[error("invalid classifier artifact: {0}")]
    InvalidArtifact(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PredictorError>;
