// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP error responses
//!
//! Every failure is answered with `{"success": false, "error", "detail"}`.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cadmesh_converter::{ConvertError, SUPPORTED_EXTENSIONS};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// An error answered to the client
#[derive(Error, Debug)]
#[error("{status}: {message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    detail: &'a str,
}

impl ApiError {
    /// Create an error with an explicit status
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 400 for an extension outside the supported set
    pub fn unsupported(extension: &str) -> Self {
        Self::bad_request(format!(
            "Unsupported file format: {}. Supported: {}",
            extension,
            SUPPORTED_EXTENSIONS.join(", ")
        ))
    }

    /// 413 Payload Too Large
    pub fn too_large(max_mb: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File too large. Maximum size: {} MB", max_mb),
        )
    }

    /// 504 Gateway Timeout
    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            format!("Conversion timed out after {} s", limit.as_secs()),
        )
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a multipart decoding error, keeping its status (400 or 413)
    pub fn multipart(err: MultipartError, max_mb: usize) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => Self::too_large(max_mb),
            status => Self::new(status, format!("Failed to read file: {}", err.body_text())),
        }
    }

    /// Status code sent to the client
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message sent to the client
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        let status = match &err {
            ConvertError::UnsupportedFormat(ext) => return Self::unsupported(ext),
            ConvertError::ParseFailure { .. }
            | ConvertError::TessellationFailure(_)
            | ConvertError::EmptyResult(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConvertError::Io(_) | ConvertError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let body = ErrorBody {
            success: false,
            error: &self.message,
            detail: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_error_statuses() {
        let cases = [
            (ConvertError::unsupported(".obj"), StatusCode::BAD_REQUEST),
            (ConvertError::parse("STEP", "bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (ConvertError::tessellation("refused"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ConvertError::EmptyResult("a.step".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ConvertError::Io(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ConvertError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_unsupported_message_lists_formats() {
        let err = ApiError::from(ConvertError::unsupported(".obj"));
        assert_eq!(
            err.message(),
            "Unsupported file format: .obj. Supported: .step, .stp, .iges, .igs"
        );
    }

    #[test]
    fn test_parse_failure_keeps_detail() {
        let err = ApiError::from(ConvertError::parse("IGES", "no directory section"));
        assert!(err.message().contains("no directory section"));
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            ApiError::too_large(50).message(),
            "File too large. Maximum size: 50 MB"
        );
        assert_eq!(
            ApiError::timeout(Duration::from_secs(120)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
