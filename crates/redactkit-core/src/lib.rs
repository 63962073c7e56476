//! # redactkit-core
//!
//! Reversible PII redaction for text bound for external language models.
//!
//! Detected values are swapped for typed placeholders such as `[EMAIL_1]`;
//! the returned [`RedactionMap`] lets [`restore`] put them back once the
//! model's response comes home. Detection is a priority-ordered regex catalog
//! with checksum validators, followed by name and address heuristics. An
//! optional remote, AI-assisted path sits behind [`router::ModeRouter`] and
//! fails closed.
//!
//! ```
//! let result = redactkit_core::redact("Contact John Smith at john.smith@example.com");
//! assert_eq!(result.redacted_content, "Contact [NAME_2] at [EMAIL_1]");
//! assert_eq!(
//!     redactkit_core::restore(&result.redacted_content, &result.redaction_map),
//!     "Contact John Smith at john.smith@example.com"
//! );
//! ```

pub mod catalog;
pub mod detector;
pub mod error;
pub mod heuristics;
pub mod policy;
pub mod redactor;
pub mod remote;
pub mod restore;
pub mod router;
pub mod types;
pub mod validators;

pub use catalog::{CompiledPattern, PiiPattern};
pub use detector::{Detection, PiiDetector};
pub use error::{RedactError, RedactResult, RemoteServiceError};
pub use policy::{ModePolicy, RedactionOptions, StaticModePolicy};
pub use redactor::Redactor;
pub use restore::restore;
pub use router::{ModeRouter, RedactionMode, RedactionOutcome};
pub use types::{DetectionStats, PiiType, Placeholder, RedactionMap, RedactionResult};

use once_cell::sync::Lazy;

static DEFAULT_REDACTOR: Lazy<Redactor> = Lazy::new(Redactor::new);

/// Redact `text` with the built-in catalog and default options.
pub fn redact(text: &str) -> RedactionResult {
    DEFAULT_REDACTOR.redact(text, &RedactionOptions::default())
}

/// Quick check: would the default redactor change this text?
pub fn contains_pii(text: &str) -> bool {
    redact(text).pii_detected
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_contains_pii() {
        assert!(contains_pii("ring 07911 123456"));
        assert!(!contains_pii("the meeting moved to three o'clock"));
    }

    #[test]
    fn test_shared_redactor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Redactor>();
        assert_send_sync::<RedactionResult>();
    }

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("John Smith".to_string()),
            Just("jane.doe@example.co.uk".to_string()),
            Just("07911 123456".to_string()),
            Just("020 7946 0958".to_string()),
            Just("4111 1111 1111 1111".to_string()),
            Just("AB123456C".to_string()),
            Just("GB82 WEST 1234 5698 7654 32".to_string()),
            Just("DOB: 04/07/1986".to_string()),
            Just("10.0.0.1".to_string()),
            Just("221 Baker Street, London NW1 6XE".to_string()),
            "[a-zA-Z0-9 ,.:@/+-]{0,24}",
            "\\PC{0,12}".prop_filter("no brackets", |s| !s.contains(['[', ']'])),
        ]
    }

    proptest! {
        #[test]
        fn prop_restore_inverts_redact(parts in prop::collection::vec(fragment(), 0..8)) {
            let input = parts.join(" ");
            let result = redact(&input);
            let restored = restore(&result.redacted_content, &result.redaction_map);
            prop_assert_eq!(restored, input.clone());
            prop_assert_eq!(result.pii_detected, !result.redaction_map.is_empty());
        }

        #[test]
        fn prop_redacted_values_do_not_leak(parts in prop::collection::vec(fragment(), 1..6)) {
            let input = parts.join(" ; ");
            let result = redact(&input);
            for (original, placeholder) in result.redaction_map.iter() {
                prop_assert!(!result.redacted_content.contains(original), "{} leaked", placeholder);
            }
        }
    }
}
