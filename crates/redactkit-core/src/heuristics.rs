//! Structural detectors that don't fit the single-regex catalog model.
//!
//! Both are heuristics. They miss some names and addresses and flag the odd
//! false positive; that trade-off is accepted in exchange for not shipping an
//! NLP model.

use crate::detector::{Detection, PiiDetector};
use crate::types::PiiType;
use crate::validators;
use once_cell::sync::Lazy;
use regex::Regex;

static CAPITALIZED_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]*(?:['-][A-Z][a-z]+)*\b").expect("capitalized token is a valid regex")
});

static PREPOSITION_BEFORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:at|in|near|from|to)\s+$")
        .expect("preposition look-behind is a valid regex")
});

static UK_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b\d{{1,5}}[A-Za-z]?,?\s+(?:[A-Z][A-Za-z'-]*\s+){{0,4}}(?:{})\b,?(?:\s+[A-Z][A-Za-z'-]*,?){{0,4}}\s+(?P<postcode>[A-Z]{{1,2}}\d[A-Z\d]?\s?\d[A-Z]{{2}})\b",
        STREET_SUFFIXES.join("|")
    ))
    .expect("UK address is a valid regex")
});

/// Street-type words that end the street part of an address.
const STREET_SUFFIXES: &[&str] = &[
    "Street", "Road", "Avenue", "Lane", "Drive", "Close", "Way", "Court", "Place", "Square",
    "Gardens", "Terrace", "Hill", "Park", "Crescent",
];

/// Minimum length of each capitalized token in a name.
const MIN_TOKEN_LEN: usize = 3;

/// Bytes of context inspected for a preceding preposition.
const LOOK_BEHIND: usize = 12;

/// Capitalized bigrams that are places, roles, salutations or organisations.
const EXCLUDED_BIGRAMS: &[&str] = &[
    "United Kingdom", "United States", "Great Britain", "Northern Ireland", "New York",
    "New Zealand", "Hong Kong", "Los Angeles", "San Francisco", "South Africa", "European Union",
    "North West", "North East", "South West", "South East", "East Midlands", "West Midlands",
    "Human Resources", "Managing Director", "Chief Executive", "Finance Director",
    "Operations Manager", "Line Manager", "Team Leader", "Customer Service", "Customer Services",
    "Head Office", "Data Protection", "Privacy Policy", "Kind Regards", "Best Regards",
    "Yours Sincerely", "Yours Faithfully", "Good Morning", "Good Afternoon", "Good Evening",
    "Dear Sir", "Dear Madam", "Bank Holiday", "Christmas Day", "Boxing Day", "New Year",
    "High Court", "Supreme Court", "Crown Court", "City Council", "County Council",
    "Police Station", "Health Service", "Internal Audit", "Board Meeting", "Annual Report",
];

/// Words that open a sentence or title a person, never the first half of a name.
const LEAD_IN_WORDS: &[&str] = &[
    "Contact", "Dear", "Hello", "Hey", "Thanks", "Thank", "Regards", "Please", "Attn",
    "The", "This", "That", "These", "Those", "Our", "Your", "Their", "His", "Her", "And",
    "But", "For", "With", "From", "When", "Where", "What", "Why", "How", "Yesterday", "Today",
    "Tomorrow", "Subject", "Report", "Mrs", "Miss", "Sir", "Madam", "Lord", "Lady", "Prof",
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// `Capitalized Capitalized` person-name heuristic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameDetector;

impl NameDetector {
    pub fn new() -> Self {
        Self
    }

    fn preceded_by_preposition(text: &str, start: usize) -> bool {
        let mut from = start.saturating_sub(LOOK_BEHIND);
        while !text.is_char_boundary(from) {
            from -= 1;
        }
        PREPOSITION_BEFORE.is_match(&text[from..start])
    }

    fn classify(text: &str, first: &str, second: &str, start: usize, end: usize) -> Pairing {
        if first.len() < MIN_TOKEN_LEN
            || second.len() < MIN_TOKEN_LEN
            || LEAD_IN_WORDS.contains(&first)
        {
            return Pairing::Slide;
        }
        let bigram = format!("{first} {second}");
        if STREET_SUFFIXES.contains(&second)
            || EXCLUDED_BIGRAMS.contains(&bigram.as_str())
            || EXCLUDED_BIGRAMS.contains(&&text[start..end])
            || Self::preceded_by_preposition(text, start)
        {
            return Pairing::Skip;
        }
        Pairing::Name
    }
}

/// What to do with a pair of adjacent capitalized tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pairing {
    Name,
    /// Drop the first token only; the second may still open a name.
    Slide,
    /// Both tokens belong to a place or title, neither may start a name.
    Skip,
}

impl PiiDetector for NameDetector {
    fn pii_type(&self) -> PiiType {
        PiiType::Name
    }

    fn detect(&self, text: &str) -> Vec<Detection> {
        let tokens: Vec<_> = CAPITALIZED_TOKEN.find_iter(text).collect();
        let mut detections = Vec::new();

        let mut i = 0;
        while i + 1 < tokens.len() {
            let (first, second) = (tokens[i], tokens[i + 1]);
            let gap = &text[first.end()..second.start()];
            let adjacent = !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t');

            let pairing = if adjacent {
                Self::classify(text, first.as_str(), second.as_str(), first.start(), second.end())
            } else {
                Pairing::Slide
            };

            match pairing {
                Pairing::Name => {
                    detections.push(Detection::new(
                        PiiType::Name,
                        first.start(),
                        second.end(),
                        &text[first.start()..second.end()],
                    ));
                    i += 2;
                }
                Pairing::Skip => i += 2,
                Pairing::Slide => i += 1,
            }
        }
        detections
    }
}

/// `<number> <tokens> <street suffix> <tokens> <UK postcode>` heuristic.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressDetector;

impl AddressDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for AddressDetector {
    fn pii_type(&self) -> PiiType {
        PiiType::Address
    }

    fn detect(&self, text: &str) -> Vec<Detection> {
        UK_ADDRESS
            .captures_iter(text)
            .filter(|caps| {
                caps.name("postcode")
                    .is_some_and(|postcode| validators::uk_postcode(postcode.as_str()))
            })
            .filter_map(|caps| caps.get(0))
            .map(|m| Detection::new(PiiType::Address, m.start(), m.end(), m.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        NameDetector.detect(text).iter().map(|d| d.original.clone()).collect()
    }

    fn addresses(text: &str) -> Vec<String> {
        AddressDetector.detect(text).iter().map(|d| d.original.clone()).collect()
    }

    #[test]
    fn test_finds_name_after_lead_in_word() {
        assert_eq!(names("Contact John Smith at john.smith@example.com"), ["John Smith"]);
    }

    #[test]
    fn test_finds_hyphenated_and_apostrophe_names() {
        assert_eq!(names("Report filed by Mary-Jane O'Brien yesterday"), ["Mary-Jane O'Brien"]);
    }

    #[test]
    fn test_skips_excluded_bigrams() {
        assert!(names("Please email Human Resources about it").is_empty());
        assert!(names("Kind Regards").is_empty());
        assert!(names("221 Baker Street").is_empty());
    }

    #[test]
    fn test_skips_place_after_preposition() {
        assert!(names("The incident happened near Kings Cross station").is_empty());
        assert!(names("He moved to Milton Keynes last year").is_empty());
        assert_eq!(names("Tom Baker saw it"), ["Tom Baker"]);
    }

    #[test]
    fn test_three_word_place_is_not_split_into_a_name() {
        assert!(names("He lives near Kings Cross Station now").is_empty());
        assert!(names("Contact Human Resources Team today").is_empty());
        assert_eq!(names("Dear Sarah Jones"), ["Sarah Jones"]);
    }

    #[test]
    fn test_requires_three_letter_tokens_on_one_line() {
        assert!(names("Al Gore").is_empty());
        assert!(names("Hello\nJohn Smith").contains(&"John Smith".to_string()));
        assert!(names("Sarah\nJones").is_empty());
    }

    #[test]
    fn test_ignores_all_caps_words() {
        assert!(names("NHS England").is_empty());
    }

    #[test]
    fn test_finds_full_uk_address() {
        assert_eq!(
            addresses("Send it to 221 Baker Street, London NW1 6XE please."),
            ["221 Baker Street, London NW1 6XE"]
        );
        assert_eq!(
            addresses("Lives at 14 Rose Hill Gardens Bristol BS8 1TH"),
            ["14 Rose Hill Gardens Bristol BS8 1TH"]
        );
    }

    #[test]
    fn test_address_needs_suffix_and_postcode() {
        assert!(addresses("221 Baker London NW1 6XE").is_empty());
        assert!(addresses("221 Baker Street, London").is_empty());
    }
}
