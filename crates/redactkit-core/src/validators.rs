//! False-positive filters for ambiguous catalog patterns.
//!
//! Every validator is a plain `fn(&str) -> bool` over the exact matched
//! substring. Returning `false` drops the candidate for that pattern only: it is
//! never handed to a lower-priority pattern for a second opinion. Validators can
//! only reject, a pattern without one accepts every match.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv6Addr;

/// Signature shared by all validators.
pub type Validator = fn(&str) -> bool;

static UK_POSTCODE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Z]{1,2}[0-9][A-Z0-9]?|GIR) ?[0-9][A-Z]{2}$")
        .expect("UK postcode shape is a valid regex")
});

/// Top-level domains accepted by [`email`]. Generic TLDs first, then country codes.
const EMAIL_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "mil", "int", "info", "biz", "io", "co", "ai", "app",
    "dev", "me", "tech", "online", "email", "name", "pro", "xyz", "cloud", "health", "law",
    "uk", "us", "ie", "de", "fr", "es", "it", "nl", "be", "ch", "at", "se", "no", "dk", "fi",
    "pl", "pt", "gr", "cz", "hu", "ro", "bg", "hr", "sk", "si", "lt", "lv", "ee", "lu", "mt",
    "cy", "is", "ca", "mx", "br", "ar", "cl", "au", "nz", "jp", "cn", "hk", "sg", "in", "kr",
    "za", "ng", "ke", "ae", "il", "tr", "ru", "ua", "eu",
];

/// NI prefixes that are never issued.
const NI_INVALID_PREFIXES: &[&str] = &["BG", "GB", "NK", "KN", "TN", "NT", "ZZ"];

/// Expected IBAN length per country.
pub(crate) const IBAN_LENGTHS: &[(&str, usize)] = &[
    ("AD", 24), ("AE", 23), ("AT", 20), ("BE", 16), ("BG", 22), ("CH", 21), ("CY", 28),
    ("CZ", 24), ("DE", 22), ("DK", 18), ("EE", 20), ("ES", 24), ("FI", 18), ("FR", 27),
    ("GB", 22), ("GI", 23), ("GR", 27), ("HR", 21), ("HU", 28), ("IE", 22), ("IS", 26),
    ("IT", 27), ("LI", 21), ("LT", 20), ("LU", 20), ("LV", 21), ("MC", 27), ("MT", 31),
    ("NL", 18), ("NO", 15), ("PL", 28), ("PT", 25), ("RO", 24), ("SE", 24), ("SI", 19),
    ("SK", 24), ("SM", 27), ("TR", 26),
];

fn compact(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Luhn checksum over a card number. Spaces and dashes are ignored, any other
/// non-digit rejects; 13 to 19 digits required.
#[must_use]
pub fn luhn(candidate: &str) -> bool {
    let digits = compact(candidate);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// UK National Insurance number format rules.
#[must_use]
pub fn ni_number(candidate: &str) -> bool {
    let value = compact(candidate).to_ascii_uppercase();
    let bytes = value.as_bytes();
    if bytes.len() != 9 {
        return false;
    }

    let (first, second) = (bytes[0], bytes[1]);
    if !first.is_ascii_uppercase() || !second.is_ascii_uppercase() {
        return false;
    }
    if b"DFIQUV".contains(&first) || b"DFIOQUV".contains(&second) {
        return false;
    }
    if NI_INVALID_PREFIXES.contains(&&value[..2]) {
        return false;
    }

    bytes[2..8].iter().all(u8::is_ascii_digit) && (b'A'..=b'D').contains(&bytes[8])
}

/// IBAN: `CC99XXXX…` shape, per-country length and the ISO 7064 mod-97 check.
#[must_use]
pub fn iban(candidate: &str) -> bool {
    let value = compact(candidate).to_ascii_uppercase();
    if value.len() < 5 || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    let bytes = value.as_bytes();
    if !bytes[0].is_ascii_uppercase()
        || !bytes[1].is_ascii_uppercase()
        || !bytes[2].is_ascii_digit()
        || !bytes[3].is_ascii_digit()
    {
        return false;
    }

    let expected = IBAN_LENGTHS
        .iter()
        .find(|(country, _)| *country == &value[..2])
        .map(|(_, len)| *len);
    if expected != Some(value.len()) {
        return false;
    }

    // Move country code and check digits to the end, letters count as 10..=35.
    let rearranged = value[4..].chars().chain(value[..4].chars());
    let mut remainder: u32 = 0;
    for c in rearranged {
        let Some(n) = c.to_digit(36) else {
            return false;
        };
        remainder = if n >= 10 {
            (remainder * 100 + n) % 97
        } else {
            (remainder * 10 + n) % 97
        };
    }
    remainder == 1
}

/// Dotted-quad IPv4 with every octet in 0..=255 and no leading zeros.
#[must_use]
pub fn ipv4(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|part| {
            !part.is_empty()
                && part.len() <= 3
                && part.chars().all(|c| c.is_ascii_digit())
                && !(part.len() > 1 && part.starts_with('0'))
                && part.parse::<u8>().is_ok()
        })
}

/// IPv6 that actually parses, with at least two non-empty groups and four hex
/// digits so `std::fmt`-style `d::f` fragments don't qualify.
#[must_use]
pub fn ipv6(candidate: &str) -> bool {
    if candidate.parse::<Ipv6Addr>().is_err() {
        return false;
    }
    let groups = candidate.split(':').filter(|g| !g.is_empty()).count();
    let hex_digits = candidate.chars().filter(char::is_ascii_hexdigit).count();
    groups >= 2 && hex_digits >= 4
}

/// Email whose top-level domain is on the allow-list.
#[must_use]
pub fn email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || domain.starts_with('.') || domain.contains("..") {
        return false;
    }
    domain
        .rsplit('.')
        .next()
        .map(|tld| EMAIL_TLDS.contains(&tld.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Eight-digit UK account number. A repeated 4-digit block (`20242024`) or a
/// single repeated digit looks like a year or filler, not an account.
#[must_use]
pub fn bank_account_uk(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() != 8 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    if bytes[..4] == bytes[4..] {
        return false;
    }
    !bytes.iter().all(|b| *b == bytes[0])
}

/// UK sort code; the all-zero code is a placeholder, not a bank.
#[must_use]
pub fn sort_code(candidate: &str) -> bool {
    let digits = compact(candidate);
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_digit()) && digits != "000000"
}

/// US SSN issuance rules: no 000/666/9xx area, no 00 group, no 0000 serial.
#[must_use]
pub fn ssn(candidate: &str) -> bool {
    let digits = compact(candidate);
    if digits.len() != 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let (area, group, serial) = (&digits[..3], &digits[3..5], &digits[5..]);
    area != "000" && area != "666" && !area.starts_with('9') && group != "00" && serial != "0000"
}

/// NHS number modulus 11 check digit.
#[must_use]
pub fn nhs_number(candidate: &str) -> bool {
    let digits: Vec<u32> = compact(candidate)
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();
    if digits.len() != 10 {
        return false;
    }

    let sum: u32 = digits[..9]
        .iter()
        .zip((2..=10).rev())
        .map(|(d, weight)| d * weight)
        .sum();
    let check = match 11 - (sum % 11) {
        11 => 0,
        10 => return false,
        n => n,
    };
    check == digits[9]
}

/// E.164 bounds for the international catch-all: 8 to 15 digits.
#[must_use]
pub fn phone_intl(candidate: &str) -> bool {
    let count = candidate.chars().filter(char::is_ascii_digit).count();
    (8..=15).contains(&count)
}

/// UK postcode shape, e.g. `SW1A 1AA`, `M1 1AE`, `GIR 0AA`.
#[must_use]
pub fn uk_postcode(candidate: &str) -> bool {
    UK_POSTCODE_SHAPE.is_match(candidate.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn_accepts_test_cards() {
        assert!(luhn("4111111111111111"));
        assert!(luhn("4111 1111 1111 1111"));
        assert!(luhn("5500-0000-0000-0004"));
        assert!(luhn("378282246310005"));
    }

    #[test]
    fn test_luhn_rejects_bad_checksum_and_length() {
        assert!(!luhn("1234567812345678"));
        assert!(!luhn("4111111111111112"));
        assert!(!luhn("411111111111"));
        assert!(!luhn("41111111111111111111"));
        assert!(!luhn("4111x111111111111"));
    }

    #[test]
    fn test_ni_number_format_rules() {
        assert!(ni_number("AB123456C"));
        assert!(ni_number("AB 12 34 56 C"));
        assert!(!ni_number("QQ123456C"));
        assert!(!ni_number("AO123456C"));
        assert!(!ni_number("GB123456A"));
        assert!(!ni_number("BG123456A"));
        assert!(!ni_number("AB123456E"));
    }

    #[test]
    fn test_iban_length_and_checksum() {
        assert!(iban("GB82WEST12345698765432"));
        assert!(iban("GB82 WEST 1234 5698 7654 32"));
        assert!(iban("DE89370400440532013000"));
        assert!(!iban("GB82WEST1234569876543"));
        assert!(!iban("GB83WEST12345698765432"));
        assert!(!iban("XX82WEST12345698765432"));
    }

    #[test]
    fn test_ipv4_octets() {
        assert!(ipv4("192.168.1.10"));
        assert!(ipv4("0.0.0.0"));
        assert!(!ipv4("256.1.1.1"));
        assert!(!ipv4("192.168.01.1"));
        assert!(!ipv4("1.2.3"));
    }

    #[test]
    fn test_ipv6_requires_real_address() {
        assert!(ipv6("2001:0db8:85a3:0000:0000:8a2e:0370:7334"));
        assert!(ipv6("fe80::1ff:fe23:4567:890a"));
        assert!(!ipv6("d::f"));
        assert!(!ipv6("12:30:45"));
        assert!(!ipv6("00:1A:2B:3C:4D:5E"));
    }

    #[test]
    fn test_email_tld_allow_list() {
        assert!(email("john.smith@example.com"));
        assert!(email("a.b@nhs.uk"));
        assert!(!email("build@version.final"));
        assert!(!email("@example.com"));
    }

    #[test]
    fn test_bank_account_rejects_repeats() {
        assert!(bank_account_uk("31926819"));
        assert!(!bank_account_uk("20242024"));
        assert!(!bank_account_uk("11111111"));
        assert!(!bank_account_uk("1234567"));
    }

    #[test]
    fn test_ssn_issuance_rules() {
        assert!(ssn("123-45-6789"));
        assert!(!ssn("000-45-6789"));
        assert!(!ssn("666-45-6789"));
        assert!(!ssn("912-45-6789"));
        assert!(!ssn("123-00-6789"));
        assert!(!ssn("123-45-0000"));
    }

    #[test]
    fn test_nhs_check_digit() {
        assert!(nhs_number("943 476 5919"));
        assert!(nhs_number("9434765919"));
        assert!(!nhs_number("943 476 5918"));
    }

    #[test]
    fn test_sort_code_and_phone_bounds() {
        assert!(sort_code("20-00-00"));
        assert!(!sort_code("00-00-00"));
        assert!(phone_intl("+33 1 42 68 53 00"));
        assert!(!phone_intl("+1 234"));
    }

    #[test]
    fn test_postcode_shape() {
        assert!(uk_postcode("SW1A 1AA"));
        assert!(uk_postcode("M1 1AE"));
        assert!(uk_postcode("NW1 6XE"));
        assert!(!uk_postcode("SW1A"));
        assert!(!uk_postcode("12345"));
    }
}
