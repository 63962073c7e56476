//! Placeholder restoration.

use crate::types::RedactionMap;

/// Put the original values back into a redacted text.
///
/// Single left-to-right scan: every `[...]` token found in the map's inverse
/// is replaced, anything else is copied through verbatim. Restored values are
/// never re-scanned, so an original that itself looks like a placeholder
/// cannot trigger a second substitution.
pub fn restore(redacted_text: &str, map: &RedactionMap) -> String {
    if map.is_empty() {
        return redacted_text.to_string();
    }

    let inverse = map.inverse();
    let mut out = String::with_capacity(redacted_text.len());
    let mut rest = redacted_text;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        // Step 1: Nearest closing bracket after this opening one
        let Some(close) = candidate[1..].find(']').map(|i| i + 1) else {
            out.push_str(candidate);
            return out;
        };

        // Step 2: Inner '[' means this one can't start a token, retry from there
        if let Some(inner) = candidate[1..close].rfind('[').map(|i| i + 1) {
            out.push_str(&candidate[..inner]);
            rest = &candidate[inner..];
            continue;
        }

        let token = &candidate[..=close];
        match inverse.get(token) {
            Some(original) => out.push_str(original),
            None => out.push_str(token),
        }
        rest = &candidate[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> RedactionMap {
        let mut map = RedactionMap::new();
        for (original, placeholder) in pairs {
            map.insert(*original, *placeholder);
        }
        map
    }

    #[test]
    fn test_restores_every_occurrence() {
        let m = map(&[("Jane Doe", "[NAME_1]"), ("jane@example.com", "[EMAIL_2]")]);
        assert_eq!(
            restore("[NAME_1] <[EMAIL_2]> signed as [NAME_1]", &m),
            "Jane Doe <jane@example.com> signed as Jane Doe"
        );
    }

    #[test]
    fn test_unknown_tokens_are_kept() {
        let m = map(&[("Jane Doe", "[NAME_1]")]);
        assert_eq!(
            restore("see [NAME_9] and [1] and [NAME_1]", &m),
            "see [NAME_9] and [1] and Jane Doe"
        );
    }

    #[test]
    fn test_original_resembling_placeholder_is_not_rescanned() {
        // [NAME_1] restores to the literal text "[EMAIL_2]", which must stay.
        let m = map(&[("[EMAIL_2]", "[NAME_1]"), ("a@b.com", "[EMAIL_2]")]);
        assert_eq!(restore("[NAME_1] / [EMAIL_2]", &m), "[EMAIL_2] / a@b.com");
    }

    #[test]
    fn test_nested_and_unbalanced_brackets() {
        let m = map(&[("Jane Doe", "[NAME_1]")]);
        assert_eq!(restore("[[NAME_1]]", &m), "[Jane Doe]");
        assert_eq!(restore("a[b [NAME_1", &m), "a[b [NAME_1");
        assert_eq!(restore("]][NAME_1][", &m), "]]Jane Doe[");
    }

    #[test]
    fn test_caller_duplicated_placeholder_is_safe() {
        let m = map(&[("07911 123456", "[PHONE_UK_MOBILE_1]")]);
        let corrupted = "[PHONE_UK_MOBILE_1][PHONE_UK_MOBILE_1] [PHONE_UK_MOBILE_1";
        assert_eq!(restore(corrupted, &m), "07911 12345607911 123456 [PHONE_UK_MOBILE_1");
    }

    #[test]
    fn test_empty_map_is_identity() {
        assert_eq!(restore("[EMAIL_1] stays", &RedactionMap::new()), "[EMAIL_1] stays");
    }

    #[test]
    fn test_multibyte_text_around_tokens() {
        let m = map(&[("Zoë Brontë", "[NAME_1]")]);
        assert_eq!(restore("→ [NAME_1] ← £", &m), "→ Zoë Brontë ← £");
    }
}
