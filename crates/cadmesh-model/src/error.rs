// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for reading and converting CAD files

use crate::EntityId;
use thiserror::Error;

/// Result type alias for reader operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while reading a STEP or IGES file
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Failed to parse header or global section
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Failed to parse entity
    #[error("Failed to parse entity {0}: {1}")]
    EntityParse(EntityId, String),

    /// Entity not found
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// Invalid entity reference
    #[error("Invalid entity reference at {entity}: attribute {attribute}")]
    InvalidReference { entity: EntityId, attribute: usize },

    /// Missing required attribute
    #[error("Missing required attribute {attribute} on entity {entity}")]
    MissingAttribute { entity: EntityId, attribute: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ParseError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        ParseError::InvalidFormat(msg.into())
    }

    /// Create a new header error
    pub fn header(msg: impl Into<String>) -> Self {
        ParseError::InvalidHeader(msg.into())
    }

    /// Create a new entity parse error
    pub fn entity_parse(id: EntityId, msg: impl Into<String>) -> Self {
        ParseError::EntityParse(id, msg.into())
    }

    /// Create a missing attribute error
    pub fn missing(entity: EntityId, attribute: usize) -> Self {
        ParseError::MissingAttribute { entity, attribute }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ParseError::Other(msg.into())
    }
}

/// Conversion failure taxonomy
///
/// This is the only error type that crosses the converter boundary; reader,
/// kernel and triangulation errors are mapped into it.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Unrecognized extension (caller error)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The kernel rejected the file content
    #[error("Failed to read {format} file: {message}")]
    ParseFailure { format: String, message: String },

    /// The kernel could not mesh a parsed shape
    #[error("Failed to mesh the shape: {0}")]
    TessellationFailure(String),

    /// No face produced a triangulation
    #[error("No tessellated geometry found in {0}")]
    EmptyResult(String),

    /// Temporary file handling failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected failure inside the kernel
    #[error("Conversion failed: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Create an unsupported format error for an extension
    pub fn unsupported(ext: impl Into<String>) -> Self {
        ConvertError::UnsupportedFormat(ext.into())
    }

    /// Create a parse failure for a format tag
    pub fn parse(format: impl Into<String>, msg: impl Into<String>) -> Self {
        ConvertError::ParseFailure {
            format: format.into(),
            message: msg.into(),
        }
    }

    /// Create a tessellation failure
    pub fn tessellation(msg: impl Into<String>) -> Self {
        ConvertError::TessellationFailure(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ConvertError::Internal(msg.into())
    }

    /// Whether the failure was caused by the uploaded input
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ConvertError::UnsupportedFormat(_) | ConvertError::ParseFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_detail() {
        let err = ConvertError::parse("STEP", "status Fail: missing DATA section");
        assert_eq!(
            err.to_string(),
            "Failed to read STEP file: status Fail: missing DATA section"
        );
        assert!(err.is_caller_error());

        let err = ConvertError::tessellation("deflection must be positive");
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: ConvertError = io.into();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
