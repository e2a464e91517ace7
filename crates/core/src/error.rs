use pdf_annotator_model::{AnnotationKind, ModelError};

/// Errors raised by the annotation core
///
/// Runtime event handling in the painter does not surface these: unknown kinds, missing
/// records and detached editors degrade to logged no-ops. Errors are returned where a
/// caller hands in data that cannot be interpreted (serialized groups, configuration).
#[derive(Debug, thiserror::Error)]
pub enum AnnotatorError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no editor registered for annotation kind {0}")]
    UnknownKind(AnnotationKind),
    #[error("invalid configuration value for {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for annotation core operations
pub type AnnotatorResult<T> = Result<T, AnnotatorError>;
