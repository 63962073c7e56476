//! Wire model and normalization for the remote, AI-assisted redaction service.
//!
//! The service reports *where* it found PII. The core never trusts its
//! redacted text for restoration; it rebuilds placeholders and the map from
//! the reported positions so both paths hand callers the same
//! [`RedactionResult`] shape.

use crate::error::RemoteServiceError;
use crate::types::{DetectionStats, PiiType, Placeholder, RedactionMap, RedactionResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body sent to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRedactionRequest {
    pub text: String,
    pub enable_ai: bool,
}

/// Body returned by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRedactionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redacted_text: Option<String>,
    #[serde(default)]
    pub detections: Vec<RemoteDetection>,
}

/// One finding reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDetection {
    #[serde(rename = "type")]
    pub pii_type: String,
    /// Matched text as the service saw it, checked against the input slice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub position: Position,
}

/// Half-open span in characters (Unicode scalar values), not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

/// Transport to the remote service. The proxy crate provides the HTTP one;
/// tests use in-memory fakes.
#[async_trait]
pub trait RemoteRedactionService: Send + Sync {
    async fn redact(
        &self,
        request: &RemoteRedactionRequest,
    ) -> Result<RemoteRedactionResponse, RemoteServiceError>;
}

/// A detection resolved to byte offsets in the original text.
struct Span<'a> {
    start: usize,
    end: usize,
    pii_type: PiiType,
    value: &'a str,
}

/// Rebuild a reversible [`RedactionResult`] from a remote response.
///
/// Placeholders are allocated in ascending position order (one per distinct
/// value) and substituted from the end of the text backwards so earlier byte
/// offsets stay valid. When detections are present the service's own
/// `redacted_text` is ignored.
pub fn normalize_response(
    original: &str,
    response: &RemoteRedactionResponse,
) -> Result<RedactionResult, RemoteServiceError> {
    if response.detections.is_empty() {
        return match response.redacted_text.as_deref() {
            Some(redacted) if redacted != original => Err(RemoteServiceError::MalformedResponse(
                "text was changed but no detections were reported".to_string(),
            )),
            _ => Ok(RedactionResult::unchanged(original)),
        };
    }

    // Step 1: Character offsets -> byte offsets (one extra entry for end of text)
    let boundaries: Vec<usize> = original
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(original.len()))
        .collect();

    let mut spans = Vec::with_capacity(response.detections.len());
    for (idx, detection) in response.detections.iter().enumerate() {
        let Position { start, end } = detection.position;
        if start >= end {
            return Err(malformed(idx, "empty or inverted position"));
        }
        let (Some(&start_b), Some(&end_b)) = (boundaries.get(start), boundaries.get(end)) else {
            return Err(malformed(idx, "position out of range"));
        };
        let value = &original[start_b..end_b];
        if detection.value.as_deref().is_some_and(|v| v != value) {
            return Err(malformed(idx, "value does not match text at position"));
        }
        spans.push(Span {
            start: start_b,
            end: end_b,
            pii_type: PiiType::from_tag(&detection.pii_type),
            value,
        });
    }

    // Step 2: Ascending order, reject overlaps
    spans.sort_by_key(|s| (s.start, s.end));
    if let Some(pair) = spans.windows(2).find(|w| w[0].end > w[1].start) {
        return Err(RemoteServiceError::MalformedResponse(format!(
            "overlapping detections at characters {}..{}",
            original[..pair[1].start].chars().count(),
            original[..pair[0].end].chars().count()
        )));
    }

    // Step 3: Allocate placeholders, same value -> same placeholder
    let mut map = RedactionMap::new();
    let mut stats = DetectionStats::default();
    let mut ordinal = 0;
    let mut placeholders = Vec::with_capacity(spans.len());
    for span in &spans {
        let placeholder = match map.get(span.value) {
            Some(existing) => existing.to_string(),
            None => {
                ordinal += 1;
                let placeholder = Placeholder::new(span.pii_type.clone(), ordinal).to_string();
                map.insert(span.value, placeholder.clone());
                stats.record(&span.pii_type);
                placeholder
            }
        };
        placeholders.push(placeholder);
    }

    // Step 4: Substitute back to front
    let mut content = original.to_string();
    for (span, placeholder) in spans.iter().zip(&placeholders).rev() {
        content.replace_range(span.start..span.end, placeholder);
    }

    debug!(
        detections = spans.len(),
        distinct = map.len(),
        "Normalized remote response"
    );
    Ok(RedactionResult::from_parts(content, map, stats))
}

fn malformed(index: usize, reason: &str) -> RemoteServiceError {
    RemoteServiceError::MalformedResponse(format!("detection {index}: {reason}"))
}
