//! Built-in PII detection rules.
//!
//! The catalog is data: each [`PiiPattern`] pairs a regex source with an
//! optional validator and a priority. Higher priorities are processed first, so
//! structured identifiers claim their text before generic shapes such as dates
//! get a chance to.
//!
//! A matcher may define a named group `pii`; only that group is redacted, which
//! lets a pattern require a cue ("DOB:", "passport no") without redacting it.

use crate::detector::{Detection, PiiDetector};
use crate::error::{RedactError, RedactResult};
use crate::types::PiiType;
use crate::validators::{self, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Name of the optional capture group that narrows a match.
pub const PII_GROUP: &str = "pii";

/// A named detection rule.
#[derive(Debug, Clone)]
pub struct PiiPattern {
    pub pii_type: PiiType,
    /// Regular expression proposing candidate substrings.
    pub matcher: String,
    /// Must return true for a candidate to be redacted; `None` accepts all.
    pub validator: Option<Validator>,
    /// Higher runs first; ties keep declaration order.
    pub priority: i32,
}

impl PiiPattern {
    pub fn new(pii_type: PiiType, matcher: impl Into<String>, priority: i32) -> Self {
        Self {
            pii_type,
            matcher: matcher.into(),
            validator: None,
            priority,
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

const DATE_NUMERIC: &str = r"\d{1,2}[/.-]\d{1,2}[/.-](?:\d{4}|\d{2})";
const DATE_ISO: &str = r"\d{4}-\d{2}-\d{2}";
const MONTHS: &str = r"(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)";

fn long_date() -> String {
    format!(r"\d{{1,2}}(?:st|nd|rd|th)?\s+{MONTHS}\.?,?\s+\d{{4}}")
}

/// One alternative per IBAN country, sized to that country's length, so a
/// trailing 4-character word is never pulled into the candidate.
fn iban_matcher() -> String {
    let countries: Vec<String> = validators::IBAN_LENGTHS
        .iter()
        .map(|(country, len)| {
            let (groups, tail) = ((len - 4) / 4, (len - 4) % 4);
            let mut alt = format!(r"{country}\d{{2}}(?:\s?[A-Z0-9]{{4}}){{{groups}}}");
            if tail > 0 {
                alt.push_str(&format!(r"\s?[A-Z0-9]{{{tail}}}"));
            }
            alt
        })
        .collect();
    format!(r"\b(?:{})\b", countries.join("|"))
}

static BUILTIN_PATTERNS: Lazy<Vec<PiiPattern>> = Lazy::new(|| {
    vec![
        // 100: unambiguous structured identifiers
        PiiPattern::new(
            PiiType::Email,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            100,
        )
        .with_validator(validators::email),
        PiiPattern::new(PiiType::EmployeeId, r"(?i)\bEMP(?:LOYEE)?[-_#]?\d{4,8}\b", 100),
        PiiPattern::new(PiiType::Ssn, r"\b\d{3}-\d{2}-\d{4}\b", 100)
            .with_validator(validators::ssn),
        PiiPattern::new(
            PiiType::NiNumber,
            r"\b[A-Z]{2}\s?\d{2}\s?\d{2}\s?\d{2}\s?[A-D]\b",
            100,
        )
        .with_validator(validators::ni_number),
        PiiPattern::new(
            PiiType::CreditCard,
            r"\b(?:\d{13,19}|\d{4}(?:[ -]\d{4}){3}|\d{4}[ -]\d{6}[ -]\d{5})\b",
            100,
        )
        .with_validator(validators::luhn),
        PiiPattern::new(PiiType::Iban, iban_matcher(), 100).with_validator(validators::iban),
        // 90/85: phone numbers, specific formats before the international catch-all
        PiiPattern::new(
            PiiType::PhoneUkLandline,
            r"(?:\+44\s?|\b0)(?:1\d{3}\s?\d{6}|1\d{2}\s?\d{3}\s?\d{4}|2\d\s?\d{4}\s?\d{4}|3\d{2}\s?\d{3}\s?\d{4})\b",
            90,
        ),
        PiiPattern::new(
            PiiType::PhoneUkMobile,
            r"(?:\+44\s?7\d{3}|\b07\d{3})\s?\d{3}\s?\d{3}\b",
            90,
        ),
        PiiPattern::new(
            PiiType::PhoneUs,
            r"(?:\+1[-.\s]?)?(?:\([2-9]\d{2}\)\s?|\b[2-9]\d{2}[-.])\d{3}[-.]\d{4}\b",
            90,
        ),
        PiiPattern::new(PiiType::PhoneIntl, r"\+[1-9]\d{0,3}(?:[\s.-]?\d{1,4}){2,6}\b", 85)
            .with_validator(validators::phone_intl),
        // 80: government document numbers
        PiiPattern::new(
            PiiType::Passport,
            r"(?i:\bpassport)(?:\s+(?i:no\.?|number|#))?\s*[:#-]?\s*(?P<pii>[A-Z]?\d{8,9})\b",
            80,
        ),
        PiiPattern::new(
            PiiType::DriversLicenseUk,
            r"\b[A-Z9]{5}\d{6}[A-Z9]{2}\d[A-Z]{2}\b",
            80,
        ),
        PiiPattern::new(PiiType::NhsNumber, r"\b\d{3}[ -]?\d{3}[ -]?\d{4}\b", 80)
            .with_validator(validators::nhs_number),
        // 70: financial identifiers with high false-positive risk
        PiiPattern::new(PiiType::BankAccountUk, r"\b\d{8}\b", 70)
            .with_validator(validators::bank_account_uk),
        PiiPattern::new(PiiType::SortCode, r"\b\d{2}-\d{2}-\d{2}\b", 70)
            .with_validator(validators::sort_code),
        // 60: location and network identifiers
        PiiPattern::new(
            PiiType::PostcodeUk,
            r"\b(?:[A-Z]{1,2}\d[A-Z\d]?|GIR)\s?\d[A-Z]{2}\b",
            60,
        ),
        PiiPattern::new(PiiType::ZipCodeUs, r"\b[A-Z]{2}\s+(?P<pii>\d{5}(?:-\d{4})?)\b", 60),
        PiiPattern::new(PiiType::IpAddress, r"\b\d{1,3}(?:\.\d{1,3}){3}\b", 60)
            .with_validator(validators::ipv4),
        PiiPattern::new(
            PiiType::Ipv6Address,
            r"(?:[0-9A-Fa-f]{0,4}:){2,7}[0-9A-Fa-f]{0,4}",
            60,
        )
        .with_validator(validators::ipv6),
        PiiPattern::new(
            PiiType::MacAddress,
            r"\b[0-9A-Fa-f]{2}(?:[:-][0-9A-Fa-f]{2}){5}\b",
            60,
        ),
        // 50/49: dates, deliberately low so they never pre-empt specific matches
        PiiPattern::new(
            PiiType::DateOfBirth,
            format!(
                r"(?i:\bDOB|\bD\.O\.B\.?|\bdate of birth|\bborn(?:\s+on)?)\s*[:-]?\s*(?P<pii>{DATE_NUMERIC}|{DATE_ISO}|{})\b",
                long_date()
            ),
            50,
        ),
        PiiPattern::new(
            PiiType::Date,
            format!(
                r"\b(?:\d{{1,2}}[/.-]\d{{1,2}}[/.-]\d{{4}}|{DATE_ISO}|{})\b",
                long_date()
            ),
            49,
        ),
        // 40: URLs carrying an email address
        PiiPattern::new(
            PiiType::UrlWithEmail,
            r#"\b(?:https?://|mailto:)[^\s"'<>]*(?:@|%40)[^\s"'<>]*[^\s"'<>.,;:!?)]"#,
            40,
        ),
    ]
});

static BUILTIN_COMPILED: Lazy<Vec<CompiledPattern>> = Lazy::new(|| compile(builtin_patterns()));

/// The built-in catalog in declaration order. Stable, no I/O.
pub fn builtin_patterns() -> &'static [PiiPattern] {
    &BUILTIN_PATTERNS
}

/// The built-in catalog, compiled once per process.
pub fn builtin_compiled() -> &'static [CompiledPattern] {
    &BUILTIN_COMPILED
}

/// Compile every pattern, skipping (and logging) the ones that fail.
///
/// A single malformed matcher only costs its own recall.
pub fn compile(patterns: &[PiiPattern]) -> Vec<CompiledPattern> {
    patterns
        .iter()
        .filter_map(|pattern| match CompiledPattern::compile(pattern.clone()) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                warn!(
                    pii_type = %pattern.pii_type,
                    error = %e,
                    "Skipping pattern that failed to compile"
                );
                None
            }
        })
        .collect()
}

/// A pattern with its regex compiled, ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: PiiPattern,
    regex: Regex,
    narrowed: bool,
}

impl CompiledPattern {
    pub fn compile(pattern: PiiPattern) -> RedactResult<Self> {
        let regex = Regex::new(&pattern.matcher).map_err(|source| RedactError::PatternCompilation {
            pii_type: pattern.pii_type.tag().to_string(),
            source,
        })?;
        let narrowed = regex.capture_names().any(|name| name == Some(PII_GROUP));
        Ok(Self {
            pattern,
            regex,
            narrowed,
        })
    }

    pub fn pattern(&self) -> &PiiPattern {
        &self.pattern
    }

    pub fn priority(&self) -> i32 {
        self.pattern.priority
    }
}

impl PiiDetector for CompiledPattern {
    fn pii_type(&self) -> PiiType {
        self.pattern.pii_type.clone()
    }

    fn detect(&self, text: &str) -> Vec<Detection> {
        let pii_type = &self.pattern.pii_type;
        if self.narrowed {
            self.regex
                .captures_iter(text)
                .filter_map(|caps| caps.name(PII_GROUP))
                .map(|m| Detection::new(pii_type.clone(), m.start(), m.end(), m.as_str()))
                .collect()
        } else {
            self.regex
                .find_iter(text)
                .map(|m| Detection::new(pii_type.clone(), m.start(), m.end(), m.as_str()))
                .collect()
        }
    }

    fn validate(&self, candidate: &str) -> bool {
        self.pattern.validator.map_or(true, |validator| validator(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pii_type: PiiType, text: &str) -> Vec<String> {
        let compiled = builtin_compiled()
            .iter()
            .find(|p| p.pattern().pii_type == pii_type)
            .expect("pattern exists");
        compiled
            .detect(text)
            .iter()
            .filter(|d| compiled.validate(&d.original))
            .map(|d| d.original.clone())
            .collect()
    }

    #[test]
    fn test_builtin_catalog_compiles() {
        assert_eq!(builtin_compiled().len(), builtin_patterns().len());
    }

    #[test]
    fn test_priorities_follow_declaration_bands() {
        let priorities: Vec<i32> = builtin_patterns().iter().map(|p| p.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted, "catalog is declared in priority order");
        assert_eq!(builtin_patterns()[0].pii_type, PiiType::Email);
    }

    #[test]
    fn test_heuristic_types_are_not_catalog_entries() {
        assert!(builtin_patterns()
            .iter()
            .all(|p| p.pii_type != PiiType::Name && p.pii_type != PiiType::Address));
    }

    #[test]
    fn test_card_match_stops_before_trailing_digits() {
        let compact = "Card 4111111111111111 12/26, cvv on back";
        assert_eq!(matches(PiiType::CreditCard, compact), ["4111111111111111"]);
        let grouped = "Card 4111 1111 1111 1111 123 on file";
        assert_eq!(matches(PiiType::CreditCard, grouped), ["4111 1111 1111 1111"]);
        let amex = "amex 3782 822463 10005";
        assert_eq!(matches(PiiType::CreditCard, amex), ["3782 822463 10005"]);
    }

    #[test]
    fn test_iban_match_is_sized_per_country() {
        assert_eq!(matches(PiiType::Iban, "Pay BE68539007547034 TEST ref"), ["BE68539007547034"]);
        assert_eq!(
            matches(PiiType::Iban, "to GB82 WEST 1234 5698 7654 32 ASAP"),
            ["GB82 WEST 1234 5698 7654 32"]
        );
        assert_eq!(matches(PiiType::Iban, "DE89370400440532013000"), ["DE89370400440532013000"]);
        assert!(matches(PiiType::Iban, "XX82WEST12345698765432").is_empty());
    }

    #[test]
    fn test_phone_patterns() {
        assert_eq!(matches(PiiType::PhoneUkMobile, "call 07911 123456 now"), ["07911 123456"]);
        assert_eq!(matches(PiiType::PhoneUkMobile, "or +44 7911 123456"), ["+44 7911 123456"]);
        assert_eq!(matches(PiiType::PhoneUkLandline, "office 020 7946 0958"), ["020 7946 0958"]);
        assert_eq!(matches(PiiType::PhoneUs, "ring (555) 123-4567"), ["(555) 123-4567"]);
        assert_eq!(matches(PiiType::PhoneIntl, "Paris +33 1 42 68 53 00"), ["+33 1 42 68 53 00"]);
    }

    #[test]
    fn test_cue_patterns_redact_only_the_value() {
        assert_eq!(matches(PiiType::DateOfBirth, "DOB: 12/05/1990"), ["12/05/1990"]);
        assert_eq!(matches(PiiType::DateOfBirth, "born on 3rd March 1985"), ["3rd March 1985"]);
        assert_eq!(matches(PiiType::Passport, "Passport no: 123456789"), ["123456789"]);
        assert_eq!(matches(PiiType::ZipCodeUs, "Springfield, IL 62704"), ["62704"]);
    }

    #[test]
    fn test_network_identifiers() {
        let ips = "from 192.168.1.10 and 999.1.1.1";
        assert_eq!(matches(PiiType::IpAddress, ips), ["192.168.1.10"]);
        assert_eq!(matches(PiiType::MacAddress, "nic 00:1A:2B:3C:4D:5E"), ["00:1A:2B:3C:4D:5E"]);
        assert_eq!(matches(PiiType::Ipv6Address, "at 12:30:45 std::fmt"), Vec::<String>::new());
    }

    #[test]
    fn test_year_alone_matches_nothing() {
        let text = "Invoice total: £45.00, reference 2024.";
        for compiled in builtin_compiled() {
            let accepted: Vec<_> = compiled
                .detect(text)
                .into_iter()
                .filter(|d| compiled.validate(&d.original))
                .collect();
            assert!(accepted.is_empty(), "{} matched", compiled.pattern().pii_type);
        }
    }

    #[test]
    fn test_bad_custom_pattern_is_skipped() {
        let patterns = vec![
            PiiPattern::new(PiiType::custom("broken"), r"(unclosed", 10),
            PiiPattern::new(PiiType::custom("ticket"), r"TCK-\d+", 10),
        ];
        let compiled = compile(&patterns);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].pattern().pii_type.tag(), "TICKET");
    }
}
