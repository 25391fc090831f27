//! Internal helpers shared by the operation modules.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID stored as text and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

/// Lowercased, trimmed form used by every case-insensitive name comparison.
pub(crate) fn fold_name(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Validate a required name: trimmed, non-empty, at most `max` characters.
pub(crate) fn require_name(value: &str, label: &str, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    if trimmed.chars().count() > max {
        return Err(EngineError::Validation(format!(
            "{label} must not exceed {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping empty input to `None` and
/// enforcing a maximum length.
pub(crate) fn optional_text(
    value: Option<&str>,
    label: &str,
    max: usize,
) -> ResultEngine<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(EngineError::Validation(format!(
            "{label} must not exceed {max} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_name_trims_and_bounds() {
        assert_eq!(require_name("  Rent ", "category", 100).unwrap(), "Rent");
        assert!(require_name("   ", "category", 100).is_err());
        assert!(require_name(&"x".repeat(101), "category", 100).is_err());
    }

    #[test]
    fn optional_text_maps_empty_to_none() {
        assert_eq!(optional_text(None, "note", 10).unwrap(), None);
        assert_eq!(optional_text(Some("  "), "note", 10).unwrap(), None);
        assert_eq!(
            optional_text(Some(" cash "), "note", 10).unwrap(),
            Some("cash".to_string())
        );
        assert!(optional_text(Some("12345678901"), "note", 10).is_err());
    }
}
