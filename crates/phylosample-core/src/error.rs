use thiserror::Error;

/// Fatal failures of the pipeline. Dropped records and unparseable dates are
/// not errors; they go through [`DropLog`](crate::drops::DropLog).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("header fields must contain 'strain'")]
    MissingStrainField,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
