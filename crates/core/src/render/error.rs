use thiserror::Error;

use super::{OutputKind, Resource};

/// Errors that keep a response from being rendered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("{kind} output is not available for {resource}")]
    NotAcceptable { kind: OutputKind, resource: Resource },
    #[error("Invalid callback name: {0}")]
    InvalidCallback(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RenderError {
    fn from(error: serde_json::Error) -> Self {
        RenderError::Serialization(error.to_string())
    }
}
