//! Error types for Drawkit operations.
//!
//! This module provides the main error type [`DrawkitError`] which wraps the
//! error conditions raised while loading, editing, laying out and saving a
//! diagram.

use std::io;

use thiserror::Error;

use drawkit_codec::{ContainerError, XmlError};
use drawkit_core::GraphError;

/// The main error type for Drawkit operations.
///
/// # Taxonomy
///
/// - `Validation`: a request was rejected before anything changed
/// - `NotFound`: a referenced cell does not exist
/// - `MalformedDocument`: a diagram file could not be decoded
/// - `Io`: reading or writing the file failed
/// - `Layout`: a layout engine failed to produce positions
/// - `Config`: a configuration file is missing, unreadable or invalid
#[derive(Debug, Error)]
pub enum DrawkitError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DrawkitError {
    /// Creates a validation error for a required field left empty.
    pub fn missing_field(field: &str) -> Self {
        Self::Validation(format!("missing required field: {field}"))
    }
}

impl From<GraphError> for DrawkitError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::NotFound(_) | GraphError::ParentNotFound(_) => {
                Self::NotFound(error.to_string())
            }
            GraphError::MissingField(_)
            | GraphError::ReservedId(_)
            | GraphError::InvalidParent(_)
            | GraphError::NotAVertex { .. } => Self::Validation(error.to_string()),
        }
    }
}

impl From<XmlError> for DrawkitError {
    fn from(error: XmlError) -> Self {
        Self::MalformedDocument(error.to_string())
    }
}

impl From<ContainerError> for DrawkitError {
    fn from(error: ContainerError) -> Self {
        Self::MalformedDocument(error.to_string())
    }
}
