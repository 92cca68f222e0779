//! Error types and HTTP response conversion
//!
//! Only failures that stop a query from running at all are errors here.
//! Filters and sort keys that cannot be applied are dropped and reported as
//! [`QueryIssue`](crate::query::QueryIssue)s instead.

#[cfg(feature = "http")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::source::SourceError;
#[cfg(feature = "http")]
use crate::source::SourceErrorKind;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// The collection's base sequence could not be retrieved
    #[error("{0}")]
    Source(#[from] SourceError),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if retrying the same request may succeed
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::Source(e) => e.is_retriable(),
            _ => false,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

#[cfg(feature = "http")]
impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

#[cfg(feature = "http")]
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CONFIG_ERROR",
                        "Service is misconfigured",
                    ),
                )
            }

            Error::Source(ref e) => {
                tracing::error!(
                    kind = %e.kind,
                    collection = ?e.collection,
                    retriable = e.is_retriable(),
                    "Source error: {}", e.message
                );

                let status = match e.kind {
                    SourceErrorKind::NotFound => StatusCode::NOT_FOUND,
                    SourceErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    SourceErrorKind::ConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let code = format!("SOURCE_{}", e.kind.to_string().to_uppercase());

                // Storage details stay in the log
                let user_message = match e.kind {
                    SourceErrorKind::NotFound => "Collection not found",
                    SourceErrorKind::Timeout => "Collection retrieval timed out",
                    SourceErrorKind::ConnectionFailed => "Collection is temporarily unavailable",
                    _ => "Collection retrieval failed",
                };

                (status, ErrorResponse::with_code(status, code, user_message))
            }

            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ),

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "Internal server error",
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_converts() {
        let err: Error = SourceError::timeout("slow").into();
        assert!(matches!(err, Error::Source(_)));
        assert!(err.is_retriable());
        assert_eq!(err.to_string(), "Source timeout error: slow");
    }

    #[test]
    fn test_non_source_errors_are_not_retriable() {
        assert!(!Error::BadRequest("nope".to_string()).is_retriable());
        assert!(!Error::Internal("boom".to_string()).is_retriable());
    }

    #[test]
    fn test_figment_error_converts() {
        let err: Error = figment::Error::from("missing field".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_error_response_display() {
        let response = ErrorResponse {
            error: "Collection not found".to_string(),
            code: Some("SOURCE_NOT_FOUND".to_string()),
            status: 404,
        };
        assert_eq!(response.to_string(), "Collection not found");
    }

    #[cfg(feature = "http")]
    mod http {
        use super::*;

        #[test]
        fn test_source_not_found_is_404() {
            let response = Error::from(SourceError::not_found("tasks")).into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        #[test]
        fn test_source_timeout_is_504() {
            let response = Error::from(SourceError::timeout("slow")).into_response();
            assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        }

        #[test]
        fn test_connection_failure_is_503() {
            let response = Error::from(SourceError::connection_failed("refused")).into_response();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        }

        #[test]
        fn test_config_and_internal_errors_are_500() {
            let config: Error = figment::Error::from("missing field".to_string()).into();
            assert_eq!(config.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

            let internal = Error::Internal("subscriber already set".to_string());
            assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }

        #[test]
        fn test_bad_request() {
            let response = Error::BadRequest("pageSize must be a number".to_string()).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[test]
        fn test_error_response_with_code() {
            let body = ErrorResponse::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", "nope");
            let json = serde_json::to_value(&body).unwrap();
            assert_eq!(json["status"], 400);
            assert_eq!(json["code"], "BAD_REQUEST");

            let body = ErrorResponse::new(StatusCode::NOT_FOUND, "gone");
            let json = serde_json::to_value(&body).unwrap();
            assert!(json.get("code").is_none());
        }
    }
}
