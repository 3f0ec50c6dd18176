//! Tool-argument cleaning.
//!
//! Models do not always pass a bare scalar: `"2"`, `'2'`, `patient_identifier=2` and
//! `patient_identifier = "2"` all turn up. Cleaning repeats until nothing changes, so
//! `clean_identifier(clean_identifier(x)) == clean_identifier(x)`.

/// Normalise an identifier-like argument to its bare value.
pub fn clean_identifier(raw: &str) -> String {
    let mut current = raw.trim().to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Clean an optional argument; blank results become `None`.
pub fn clean_optional(raw: Option<&str>) -> Option<String> {
    raw.map(clean_identifier).filter(|v| !v.is_empty())
}

/// Interpret a cleaned identifier as a numeric primary key.
pub fn numeric_id(cleaned: &str) -> Option<i64> {
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

fn clean_once(value: &str) -> String {
    let value = value.trim();
    let value = strip_key_prefix(value).trim();
    strip_matching_quotes(value).trim().to_string()
}

// Only `key=` where the key looks like an argument name; `=` inside a value is left alone.
fn strip_key_prefix(value: &str) -> &str {
    match value.split_once('=') {
        Some((key, rest)) if is_argument_name(key.trim()) => rest,
        _ => value,
    }
}

fn is_argument_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn strip_matching_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_forms_clean_to_bare_value() {
        for raw in [
            "2",
            "\"2\"",
            "'2'",
            "patient_identifier=2",
            "patient_identifier = \"2\"",
            "  2  ",
            "patient_identifier='2'",
        ] {
            assert_eq!(clean_identifier(raw), "2", "input {raw:?}");
        }
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        for raw in [
            "\"'2'\"",
            "patient_identifier=\"first_name=Ada\"",
            "MRN-001",
            "=5",
            "\"",
            "",
            "a b=c",
        ] {
            let once = clean_identifier(raw);
            assert_eq!(clean_identifier(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_nested_wrappers_are_removed() {
        assert_eq!(clean_identifier("\"'2'\""), "2");
        assert_eq!(clean_identifier("first_name=\"Maxwell782\""), "Maxwell782");
        assert_eq!(
            clean_identifier("patient_identifier = \"identifier='MRN-9'\""),
            "MRN-9"
        );
    }

    #[test]
    fn test_values_that_look_like_keys_are_kept() {
        assert_eq!(clean_identifier("a b=c"), "a b=c");
        assert_eq!(clean_identifier("=5"), "=5");
        assert_eq!(clean_identifier("\"2'"), "\"2'");
    }

    #[test]
    fn test_numeric_id() {
        assert_eq!(numeric_id("42"), Some(42));
        assert_eq!(numeric_id("MRN-42"), None);
        assert_eq!(numeric_id("-1"), None);
        assert_eq!(numeric_id(""), None);
    }

    #[test]
    fn test_clean_optional_drops_blank() {
        assert_eq!(clean_optional(Some(" '' ")), None);
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some("gender=female")), Some("female".into()));
    }
}
