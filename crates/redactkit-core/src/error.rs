//! Redaction error types.

use std::time::Duration;
use thiserror::Error;

/// Redaction result type.
pub type RedactResult<T> = Result<T, RedactError>;

/// Errors raised while detecting, redacting or restoring PII.
///
/// None of these variants ever carries an original PII value, so every one of
/// them is safe to log.
#[derive(Error, Debug)]
pub enum RedactError {
    /// A catalog or custom pattern's matcher failed to compile.
    #[error("pattern for {pii_type} failed to compile: {source}")]
    PatternCompilation {
        pii_type: String,
        #[source]
        source: regex::Error,
    },

    /// A validator panicked while checking a candidate.
    #[error("validator for {pii_type} failed on a candidate")]
    Validator { pii_type: String },

    /// The AI-assisted path could not produce a usable result.
    #[error("remote redaction service error: {0}")]
    RemoteService(#[from] RemoteServiceError),

    /// Restoring a redacted text did not reproduce the original.
    #[error("restoration mismatch: expected {expected_len} bytes, restored {restored_len}")]
    RestorationMismatch {
        expected_len: usize,
        restored_len: usize,
    },
}

impl RedactError {
    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PatternCompilation { .. } => "REDACT_PATTERN_COMPILATION",
            Self::Validator { .. } => "REDACT_VALIDATOR_FAILED",
            Self::RemoteService(e) => e.code(),
            Self::RestorationMismatch { .. } => "REDACT_RESTORATION_MISMATCH",
        }
    }

    /// Returns true if the engine can keep going after this error.
    ///
    /// Remote failures are never recoverable here: they must reach the mode
    /// router so it can fail closed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PatternCompilation { .. } | Self::Validator { .. })
    }
}

/// Failures of the remote, AI-assisted redaction path.
#[derive(Error, Debug)]
pub enum RemoteServiceError {
    /// Remote mode was selected but no service is wired in.
    #[error("no remote redaction service configured")]
    NotConfigured,

    /// Connection failed before a response arrived.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// Non-2xx response.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response could not be turned into a reversible redaction.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The call did not finish within the configured budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl RemoteServiceError {
    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "REMOTE_NOT_CONFIGURED",
            Self::Unreachable(_) => "REMOTE_UNREACHABLE",
            Self::Status { .. } => "REMOTE_STATUS",
            Self::MalformedResponse(_) => "REMOTE_MALFORMED_RESPONSE",
            Self::Timeout(_) => "REMOTE_TIMEOUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_are_not_recoverable() {
        let err = RedactError::from(RemoteServiceError::Timeout(Duration::from_secs(2)));
        assert!(!err.is_recoverable());
        assert_eq!(err.code(), "REMOTE_TIMEOUT");
    }

    #[test]
    fn test_validator_error_is_recoverable() {
        let err = RedactError::Validator { pii_type: "IBAN".into() };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "validator for IBAN failed on a candidate");
    }
}
