//! Proxy error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use redactkit_core::{RedactError, RedactionMode};
use serde::Serialize;
use thiserror::Error;

/// Proxy result type.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Proxy error.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The selected redaction path failed; nothing may be forwarded (503).
    #[error("redaction failed closed in {mode} mode: {source}")]
    FailedClosed {
        mode: RedactionMode,
        #[source]
        source: RedactError,
    },

    /// Listener or socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::FailedClosed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "PROXY_CONFIG",
            Self::FailedClosed { source, .. } => source.code(),
            Self::Io(_) => "PROXY_IO",
        }
    }
}

/// JSON error body. Never carries request content.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RedactionMode>,
    pub code: String,
    pub message: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            status: match &self {
                Self::FailedClosed { .. } => "failed_closed",
                _ => "error",
            },
            mode: match &self {
                Self::FailedClosed { mode, .. } => Some(*mode),
                _ => None,
            },
            code: self.error_code().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redactkit_core::RemoteServiceError;

    #[test]
    fn test_failed_closed_maps_to_503() {
        let err = ProxyError::FailedClosed {
            mode: RedactionMode::Remote,
            source: RemoteServiceError::Unreachable("refused".into()).into(),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "REMOTE_UNREACHABLE");
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_config_error_maps_to_500() {
        let err = ProxyError::Config("bad".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "PROXY_CONFIG");
    }
}
