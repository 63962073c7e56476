use crate::types::PiiType;
use std::ops::Range;
use zeroize::Zeroize;

/// A candidate proposed by a detector, before validation and claiming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub pii_type: PiiType,
    pub start: usize,      // byte offset into the scanned text
    pub end: usize,        // byte offset, exclusive
    pub original: String,  // matched text – wiped on drop
}

impl Detection {
    pub fn new(pii_type: PiiType, start: usize, end: usize, original: &str) -> Self {
        Self {
            pii_type,
            start,
            end,
            original: original.to_string(),
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Zeroize for Detection {
    fn zeroize(&mut self) {
        self.original.zeroize();
    }
}

impl Drop for Detection {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Source of candidates – catalog patterns and heuristics both implement it
pub trait PiiDetector: Send + Sync {
    /// Type every detection from this detector is filed under
    fn pii_type(&self) -> PiiType;

    /// Propose candidates in `text`, in input order.
    ///
    /// - offsets are byte offsets on char boundaries
    /// - the same substring may be proposed more than once
    /// - overlap with other detectors is left to the redactor's priority order
    fn detect(&self, text: &str) -> Vec<Detection>;

    /// Reject false positives (checksums, issuance rules). Runs once per
    /// distinct candidate; a rejected candidate is dropped, not handed on.
    fn validate(&self, _candidate: &str) -> bool {
        true
    }
}
