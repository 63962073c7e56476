use crate::{
    error::{RedactError, RedactResult, RemoteServiceError},
    policy::{ModePolicy, RedactionOptions},
    redactor::Redactor,
    remote::{self, RemoteRedactionRequest, RemoteRedactionService},
    types::RedactionResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// Which redaction path served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionMode {
    Local,
    Remote,
}

impl fmt::Display for RedactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// One redaction strategy. Both implementations return the same result shape.
#[async_trait]
pub trait RedactionBackend: Send + Sync {
    fn mode(&self) -> RedactionMode;

    async fn redact(&self, text: &str, options: &RedactionOptions) -> RedactResult<RedactionResult>;
}

/// Deterministic, in-process redaction.
#[derive(Debug, Clone, Default)]
pub struct LocalRedactor {
    engine: Arc<Redactor>,
}

impl LocalRedactor {
    pub fn new(engine: Arc<Redactor>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl RedactionBackend for LocalRedactor {
    fn mode(&self) -> RedactionMode {
        RedactionMode::Local
    }

    async fn redact(
        &self,
        text: &str,
        options: &RedactionOptions,
    ) -> RedactResult<RedactionResult> {
        Ok(self.engine.redact(text, options))
    }
}

/// AI-assisted redaction through a [`RemoteRedactionService`].
///
/// Local options don't apply: the service decides what it detects.
pub struct RemoteRedactor {
    service: Arc<dyn RemoteRedactionService>,
    enable_ai: bool,
    timeout: Option<Duration>,
}

impl RemoteRedactor {
    pub fn new(service: Arc<dyn RemoteRedactionService>) -> Self {
        Self {
            service,
            enable_ai: true,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_enable_ai(mut self, enable_ai: bool) -> Self {
        self.enable_ai = enable_ai;
        self
    }

    /// Upper bound on one remote call; elapsing fails the call closed.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for RemoteRedactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRedactor")
            .field("enable_ai", &self.enable_ai)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RedactionBackend for RemoteRedactor {
    fn mode(&self) -> RedactionMode {
        RedactionMode::Remote
    }

    async fn redact(
        &self,
        text: &str,
        _options: &RedactionOptions,
    ) -> RedactResult<RedactionResult> {
        let request = RemoteRedactionRequest {
            text: text.to_string(),
            enable_ai: self.enable_ai,
        };

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.redact(&request))
                .await
                .map_err(|_| RemoteServiceError::Timeout(limit))??,
            None => self.service.redact(&request).await?,
        };

        Ok(remote::normalize_response(text, &response)?)
    }
}

/// What the router hands back for one call.
#[derive(Debug)]
pub enum RedactionOutcome {
    /// Redaction ran to completion on `mode`.
    Completed {
        mode: RedactionMode,
        result: RedactionResult,
    },
    /// The selected path failed and nothing was redacted.
    ///
    /// `original_content` is returned so the caller can decide what to do with
    /// it, but it is NOT safe to forward to an external model.
    FailedClosed {
        mode: RedactionMode,
        original_content: String,
        error: RedactError,
    },
}

impl RedactionOutcome {
    pub fn mode(&self) -> RedactionMode {
        match self {
            Self::Completed { mode, .. } | Self::FailedClosed { mode, .. } => *mode,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn result(&self) -> Option<&RedactionResult> {
        match self {
            Self::Completed { result, .. } => Some(result),
            Self::FailedClosed { .. } => None,
        }
    }

    /// Text that may be sent onwards. `None` after a failure, so "redaction
    /// failed" can never be mistaken for "nothing to redact".
    pub fn forwardable_content(&self) -> Option<&str> {
        self.result().map(|r| r.redacted_content.as_str())
    }

    pub fn into_result(self) -> RedactResult<RedactionResult> {
        match self {
            Self::Completed { result, .. } => Ok(result),
            Self::FailedClosed { error, .. } => Err(error),
        }
    }
}

/// Picks local or remote redaction per call, failing closed on remote errors.
pub struct ModeRouter {
    policy: Arc<dyn ModePolicy>,
    local: LocalRedactor,
    remote: Option<RemoteRedactor>,
}

impl ModeRouter {
    /// Router without a remote path; every call is served locally unless the
    /// policy asks for remote, in which case it fails closed.
    pub fn new(policy: Arc<dyn ModePolicy>, local: LocalRedactor) -> Self {
        Self {
            policy,
            local,
            remote: None,
        }
    }

    #[must_use]
    pub fn with_remote(mut self, remote: RemoteRedactor) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Mode the policy selects right now for `scope_id`.
    pub fn select_mode(&self, scope_id: Option<&str>) -> RedactionMode {
        if self.policy.is_remote_mode_enabled(scope_id) {
            RedactionMode::Remote
        } else {
            RedactionMode::Local
        }
    }

    pub async fn redact(
        &self,
        text: &str,
        options: &RedactionOptions,
        scope_id: Option<&str>,
    ) -> RedactionOutcome {
        // Step 1: Choose the strategy once for this call
        let mode = self.select_mode(scope_id);
        debug!(%mode, "Selected redaction mode");

        // Step 2: Run it
        let outcome = match mode {
            RedactionMode::Local => self.local.redact(text, options).await,
            RedactionMode::Remote => match &self.remote {
                Some(remote) => remote.redact(text, options).await,
                None => Err(RemoteServiceError::NotConfigured.into()),
            },
        };

        // Step 3: Any failure fails closed, never falls back to local
        match outcome {
            Ok(result) => {
                info!(
                    %mode,
                    pii_detected = result.pii_detected,
                    redactions = result.redaction_map.len(),
                    "Redaction completed"
                );
                RedactionOutcome::Completed { mode, result }
            }
            Err(error) => {
                warn!(%mode, code = error.code(), error = %error, "Redaction failed closed");
                RedactionOutcome::FailedClosed {
                    mode,
                    original_content: text.to_string(),
                    error,
                }
            }
        }
    }
}

impl fmt::Debug for ModeRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeRouter")
            .field("local", &self.local)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}
