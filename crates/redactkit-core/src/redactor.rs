use crate::{
    catalog::{self, CompiledPattern},
    detector::PiiDetector,
    error::RedactError,
    heuristics::{AddressDetector, NameDetector},
    policy::RedactionOptions,
    types::{DetectionStats, Placeholder, PiiType, RedactionMap, RedactionResult},
};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Core redaction engine – orchestrates catalog, validators and heuristics
///
/// Stateless across calls: the compiled catalog is read-only, every call
/// builds its own map. Share one instance behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Redactor {
    catalog: Vec<CompiledPattern>,
    names: NameDetector,
    addresses: AddressDetector,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redactor {
    /// Redactor over the built-in catalog.
    pub fn new() -> Self {
        Self {
            catalog: catalog::builtin_compiled().to_vec(),
            names: NameDetector::new(),
            addresses: AddressDetector::new(),
        }
    }

    /// Redactor over an explicit base catalog (instead of the built-ins).
    /// Entries that fail to compile are logged and skipped.
    pub fn with_catalog(patterns: &[catalog::PiiPattern]) -> Self {
        Self {
            catalog: catalog::compile(patterns),
            ..Self::new()
        }
    }

    /// Redact PII from `text`.
    ///
    /// Every pattern scans the ORIGINAL text; accepted candidates are replaced
    /// in the working text in priority order, so whichever pattern claims a
    /// string first owns every occurrence of it.
    pub fn redact(&self, text: &str, options: &RedactionOptions) -> RedactionResult {
        if text.is_empty() {
            return RedactionResult::unchanged(text);
        }

        // Step 1: Merge catalog with per-call custom patterns, stable priority sort
        let custom = catalog::compile(&options.custom_patterns);
        let mut ordered: Vec<&CompiledPattern> = self.catalog.iter().chain(custom.iter()).collect();
        ordered.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let mut session = Session::new(text);

        // Step 2: Catalog patterns, highest priority first
        for pattern in ordered {
            session.apply(pattern, text);
        }

        // Step 3/4: Heuristics run last, still against the original text
        if options.include_names {
            session.apply(&self.names, text);
        }
        if options.include_addresses {
            session.apply(&self.addresses, text);
        }

        session.finish()
    }
}

/// One piece of the working text: either still-unclaimed input or a placeholder.
#[derive(Debug)]
enum Segment {
    Text(String),
    Placeholder(String),
}

/// Working text as a run of segments.
///
/// Replacement only rewrites unclaimed text, which gives the same result as
/// repeated whole-string replacement while guaranteeing a later pattern can
/// never rewrite the inside of an earlier placeholder.
#[derive(Debug)]
struct WorkingText {
    segments: Vec<Segment>,
}

impl WorkingText {
    fn new(text: &str) -> Self {
        Self {
            segments: vec![Segment::Text(text.to_string())],
        }
    }

    /// Replace every occurrence of `needle` in unclaimed text. Returns the
    /// number of occurrences replaced.
    fn replace_all(&mut self, needle: &str, placeholder: &str) -> usize {
        let mut replaced = 0;
        let mut next = Vec::with_capacity(self.segments.len());

        for segment in self.segments.drain(..) {
            let Segment::Text(text) = segment else {
                next.push(segment);
                continue;
            };
            if !text.contains(needle) {
                next.push(Segment::Text(text));
                continue;
            }

            let mut last = 0;
            for (idx, _) in text.match_indices(needle) {
                if idx > last {
                    next.push(Segment::Text(text[last..idx].to_string()));
                }
                next.push(Segment::Placeholder(placeholder.to_string()));
                last = idx + needle.len();
                replaced += 1;
            }
            if last < text.len() {
                next.push(Segment::Text(text[last..].to_string()));
            }
        }

        self.segments = next;
        replaced
    }

    fn render(&self) -> String {
        let len = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) | Segment::Placeholder(t) => t.len(),
            })
            .sum();
        let mut out = String::with_capacity(len);
        for segment in &self.segments {
            match segment {
                Segment::Text(t) | Segment::Placeholder(t) => out.push_str(t),
            }
        }
        out
    }
}

/// Per-call state: working text, map, stats and the shared ordinal counter.
struct Session {
    working: WorkingText,
    map: RedactionMap,
    stats: DetectionStats,
    next_ordinal: usize,
}

impl Session {
    fn new(text: &str) -> Self {
        Self {
            working: WorkingText::new(text),
            map: RedactionMap::new(),
            stats: DetectionStats::default(),
            next_ordinal: 0,
        }
    }

    /// Run one detector over the original text and claim what survives validation.
    fn apply(&mut self, detector: &dyn PiiDetector, original_text: &str) {
        let pii_type = detector.pii_type();
        let detections = detector.detect(original_text);
        if detections.is_empty() {
            return;
        }

        let mut seen = HashSet::new();
        let mut claimed = 0usize;
        let mut rejected = 0usize;

        for detection in &detections {
            let candidate = detection.original.as_str();
            if candidate.is_empty() || !seen.insert(candidate) {
                continue;
            }
            if !validate_guarded(detector, &pii_type, candidate) {
                rejected += 1;
                continue;
            }
            if self.claim(&pii_type, candidate) {
                claimed += 1;
            }
        }

        debug!(
            pii_type = %pii_type,
            candidates = seen.len(),
            claimed,
            rejected,
            "Applied detector"
        );
    }

    /// Allocate a placeholder for `original` unless it already has one, then
    /// replace it globally. Returns true when a new entry was created.
    fn claim(&mut self, pii_type: &PiiType, original: &str) -> bool {
        if self.map.contains(original) {
            return false;
        }

        self.next_ordinal += 1;
        let placeholder = Placeholder::new(pii_type.clone(), self.next_ordinal).to_string();
        let occurrences = self.working.replace_all(original, &placeholder);
        if occurrences == 0 {
            // Every occurrence was already inside text claimed by an earlier
            // pattern. The entry is still recorded, see DESIGN.md.
            debug!(
                pii_type = %pii_type,
                ordinal = self.next_ordinal,
                "Candidate fully shadowed by earlier claim"
            );
        }

        self.map.insert(original, placeholder);
        self.stats.record(pii_type);
        true
    }

    fn finish(self) -> RedactionResult {
        RedactionResult::from_parts(self.working.render(), self.map, self.stats)
    }
}

/// Run a validator, treating a panic as rejection so one bad validator can't
/// take down the rest of the catalog.
fn validate_guarded(detector: &dyn PiiDetector, pii_type: &PiiType, candidate: &str) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| detector.validate(candidate))) {
        Ok(accepted) => accepted,
        Err(_) => {
            let err = RedactError::Validator {
                pii_type: pii_type.tag().to_string(),
            };
            warn!(code = err.code(), error = %err, "Validator panicked; rejecting candidate");
            false
        }
    }
}
