//! HTTP transport for the remote redaction service.

use async_trait::async_trait;
use redactkit_core::remote::{
    RemoteRedactionRequest, RemoteRedactionResponse, RemoteRedactionService,
};
use redactkit_core::RemoteServiceError;
use reqwest::Client;
use tracing::{debug, warn};

/// Longest slice of an error body kept in `RemoteServiceError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// JSON-over-HTTP client for the remote service.
#[derive(Clone)]
pub struct HttpRedactionService {
    http_client: Client,
    endpoint: String,
}

impl HttpRedactionService {
    /// Client posting to `endpoint` (the full URL of the redact call).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpRedactionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRedactionService")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteRedactionService for HttpRedactionService {
    async fn redact(
        &self,
        request: &RemoteRedactionRequest,
    ) -> Result<RemoteRedactionResponse, RemoteServiceError> {
        debug!(
            endpoint = %self.endpoint,
            enable_ai = request.enable_ai,
            "Calling remote redaction service"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Remote redaction request failed");
                RemoteServiceError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read remote redaction response");
            RemoteServiceError::Unreachable(e.to_string())
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Remote redaction service returned error");
            return Err(RemoteServiceError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse remote redaction response");
            RemoteServiceError::MalformedResponse(e.to_string())
        })
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((cut, _)) => body[..cut].to_string(),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use redactkit_core::remote::{Position, RemoteDetection};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/redact")
    }

    fn request(text: &str) -> RemoteRedactionRequest {
        RemoteRedactionRequest {
            text: text.to_string(),
            enable_ai: true,
        }
    }

    #[tokio::test]
    async fn test_successful_round_trip() {
        let app = Router::new().route(
            "/redact",
            post(|Json(req): Json<RemoteRedactionRequest>| async move {
                let end = req.text.chars().count();
                Json(RemoteRedactionResponse {
                    redacted_text: None,
                    detections: vec![RemoteDetection {
                        pii_type: "NAME".into(),
                        value: Some(req.text.clone()),
                        position: Position { start: 0, end },
                    }],
                })
            }),
        );
        let endpoint = spawn(app).await;
        let service = HttpRedactionService::new(endpoint.clone());
        assert_eq!(service.endpoint(), endpoint);

        let response = service.redact(&request("Ann Lee")).await.unwrap();
        assert_eq!(response.detections.len(), 1);
        assert_eq!(response.detections[0].position, Position { start: 0, end: 7 });
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let app = Router::new().route(
            "/redact",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream model unavailable") }),
        );
        let service = HttpRedactionService::new(spawn(app).await);

        match service.redact(&request("x")).await {
            Err(RemoteServiceError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream model unavailable");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_malformed() {
        let app = Router::new().route("/redact", post(|| async { "not json" }));
        let service = HttpRedactionService::new(spawn(app).await);

        let err = service.redact(&request("x")).await.unwrap_err();
        assert!(matches!(err, RemoteServiceError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = HttpRedactionService::new(format!("http://{addr}/redact"));
        let err = service.redact(&request("x")).await.unwrap_err();
        assert_eq!(err.code(), "REMOTE_UNREACHABLE");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), "éé");
        assert_eq!(truncate("short", 512), "short");
    }
}
