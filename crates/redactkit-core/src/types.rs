use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use zeroize::Zeroize;

/// PII classes the engine can emit.
///
/// Design principles:
/// - Every variant renders as a stable upper snake case tag (`EMAIL`, `NI_NUMBER`)
/// - The tag is both the map namespace and the visible placeholder prefix
/// - Caller-defined classes live in `Custom`, normalized to the same tag alphabet
/// - `regulatory_basis()` names the rule each class falls under, for audit logs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PiiType {
    Email,
    EmployeeId,
    Ssn,
    NiNumber,
    CreditCard,
    Iban,
    PhoneUkLandline,
    PhoneUkMobile,
    PhoneUs,
    PhoneIntl,
    Passport,
    DriversLicenseUk,
    NhsNumber,
    BankAccountUk,
    SortCode,
    PostcodeUk,
    ZipCodeUs,
    IpAddress,
    Ipv6Address,
    MacAddress,
    DateOfBirth,
    Date,
    UrlWithEmail,
    Name,
    Address,
    /// Caller-defined class. Build through [`PiiType::custom`] so the tag stays
    /// inside `[A-Z0-9_]`.
    Custom(String),
}

impl PiiType {
    /// All built-in variants, in catalog declaration order.
    pub const BUILTIN: [PiiType; 25] = [
        Self::Email,
        Self::EmployeeId,
        Self::Ssn,
        Self::NiNumber,
        Self::CreditCard,
        Self::Iban,
        Self::PhoneUkLandline,
        Self::PhoneUkMobile,
        Self::PhoneUs,
        Self::PhoneIntl,
        Self::Passport,
        Self::DriversLicenseUk,
        Self::NhsNumber,
        Self::BankAccountUk,
        Self::SortCode,
        Self::PostcodeUk,
        Self::ZipCodeUs,
        Self::IpAddress,
        Self::Ipv6Address,
        Self::MacAddress,
        Self::DateOfBirth,
        Self::Date,
        Self::UrlWithEmail,
        Self::Name,
        Self::Address,
    ];

    /// Build a caller-defined type. Lowercase letters are uppercased and any
    /// character outside `[A-Z0-9_]` becomes `_`, so the tag can never break
    /// placeholder bracketing.
    pub fn custom(name: &str) -> Self {
        let tag: String = name
            .trim()
            .chars()
            .map(|c| {
                let c = c.to_ascii_uppercase();
                if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if tag.is_empty() {
            Self::Custom("CUSTOM".to_string())
        } else {
            Self::Custom(tag)
        }
    }

    /// Stable tag used in placeholders and detection stats.
    pub fn tag(&self) -> &str {
        match self {
            Self::Email => "EMAIL",
            Self::EmployeeId => "EMPLOYEE_ID",
            Self::Ssn => "SSN",
            Self::NiNumber => "NI_NUMBER",
            Self::CreditCard => "CREDIT_CARD",
            Self::Iban => "IBAN",
            Self::PhoneUkLandline => "PHONE_UK_LANDLINE",
            Self::PhoneUkMobile => "PHONE_UK_MOBILE",
            Self::PhoneUs => "PHONE_US",
            Self::PhoneIntl => "PHONE_INTL",
            Self::Passport => "PASSPORT",
            Self::DriversLicenseUk => "DRIVERS_LICENSE_UK",
            Self::NhsNumber => "NHS_NUMBER",
            Self::BankAccountUk => "BANK_ACCOUNT_UK",
            Self::SortCode => "SORT_CODE",
            Self::PostcodeUk => "POSTCODE_UK",
            Self::ZipCodeUs => "ZIP_CODE_US",
            Self::IpAddress => "IP_ADDRESS",
            Self::Ipv6Address => "IPV6_ADDRESS",
            Self::MacAddress => "MAC_ADDRESS",
            Self::DateOfBirth => "DATE_OF_BIRTH",
            Self::Date => "DATE",
            Self::UrlWithEmail => "URL_WITH_EMAIL",
            Self::Name => "NAME",
            Self::Address => "ADDRESS",
            Self::Custom(tag) => tag,
        }
    }

    /// Parse a tag back into a type. Unknown tags (including tags reported by
    /// the remote service) become normalized `Custom` types.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_uppercase();
        Self::BUILTIN
            .iter()
            .find(|t| t.tag() == normalized)
            .cloned()
            .unwrap_or_else(|| Self::custom(&normalized))
    }

    /// Regulatory basis for compliance auditing
    pub fn regulatory_basis(&self) -> &'static str {
        match self {
            Self::Email
            | Self::PhoneUkLandline
            | Self::PhoneUkMobile
            | Self::PhoneUs
            | Self::PhoneIntl => "GDPR Art.4(1), CCPA §1798.140(o)",
            Self::Ssn => "NIST SP 800-122 §2.1",
            Self::NiNumber | Self::NhsNumber | Self::Passport | Self::DriversLicenseUk => {
                "UK GDPR Art.87 (national identification numbers)"
            }
            Self::CreditCard => "PCI-DSS v4.0 + GDPR financial data",
            Self::Iban | Self::BankAccountUk | Self::SortCode => {
                "GDPR Art.4(1) financial identifiers"
            }
            Self::IpAddress | Self::Ipv6Address | Self::MacAddress => "GDPR Recital 30",
            Self::PostcodeUk | Self::ZipCodeUs | Self::Address => "GDPR Art.4(1) location data",
            Self::DateOfBirth | Self::Date => "HIPAA §164.514(b)(2) dates",
            Self::Name | Self::EmployeeId | Self::UrlWithEmail => {
                "GDPR Art.4(1) direct identifiers"
            }
            Self::Custom(_) => "Organisation-defined",
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for PiiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for PiiType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// A `[<TYPE>_<ordinal>]` token standing in for one redacted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub pii_type: PiiType,
    pub ordinal: usize,
}

impl Placeholder {
    pub fn new(pii_type: PiiType, ordinal: usize) -> Self {
        Self { pii_type, ordinal }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}_{}]", self.pii_type.tag(), self.ordinal)
    }
}

/// Original value -> placeholder, built fresh for every redaction call.
///
/// Keys are exact, case-sensitive originals. Values are zeroized when the map
/// is dropped so stored originals don't linger in freed memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedactionMap {
    entries: HashMap<String, String>,
}

impl RedactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: impl Into<String>, placeholder: impl Into<String>) {
        self.entries.insert(original.into(), placeholder.into());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(original, placeholder)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Placeholder -> original, used by restoration.
    pub fn inverse(&self) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .map(|(original, placeholder)| (placeholder.as_str(), original.as_str()))
            .collect()
    }
}

impl Drop for RedactionMap {
    fn drop(&mut self) {
        for (mut original, mut placeholder) in self.entries.drain() {
            original.zeroize();
            placeholder.zeroize();
        }
    }
}

/// Count of distinct originals redacted per type tag. Observability only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionStats {
    counts: BTreeMap<String, usize>,
}

impl DetectionStats {
    pub fn record(&mut self, pii_type: &PiiType) {
        *self.counts.entry(pii_type.tag().to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Output of one redaction call, identical for the local and remote paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionResult {
    pub redacted_content: String,
    pub redaction_map: RedactionMap,
    pub pii_detected: bool,
    pub detection_stats: DetectionStats,
}

impl RedactionResult {
    /// Result for text with nothing to redact.
    pub fn unchanged(text: &str) -> Self {
        Self::from_parts(text.to_string(), RedactionMap::new(), DetectionStats::default())
    }

    /// Assemble a result, deriving `pii_detected` from the map so the two can
    /// never disagree.
    pub fn from_parts(
        redacted_content: String,
        redaction_map: RedactionMap,
        detection_stats: DetectionStats,
    ) -> Self {
        Self {
            pii_detected: !redaction_map.is_empty(),
            redacted_content,
            redaction_map,
            detection_stats,
        }
    }

    /// Restore this result and compare with the text it was produced from.
    pub fn verify_round_trip(&self, original: &str) -> crate::RedactResult<()> {
        let restored = crate::restore::restore(&self.redacted_content, &self.redaction_map);
        if restored == original {
            Ok(())
        } else {
            Err(crate::RedactError::RestorationMismatch {
                expected_len: original.len(),
                restored_len: restored.len(),
            })
        }
    }
}
