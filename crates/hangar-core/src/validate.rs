//! Field validation helpers shared by the API handlers and bulk import.

use crate::error::{Error, Result};

/// Require a non-empty value after trimming surrounding whitespace.
pub fn required_trimmed(value: Option<&str>, field: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Validation(format!("{field} is required"))),
    }
}

/// Trim an optional value, mapping empty strings to `None`.
pub fn optional_trimmed(value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_whitespace() {
        assert_eq!(required_trimmed(Some("  Mavic  "), "name").unwrap(), "Mavic");
    }

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required_trimmed(None, "name").is_err());
        assert!(required_trimmed(Some("   "), "name").is_err());
    }

    #[test]
    fn optional_maps_empty_to_none() {
        assert_eq!(optional_trimmed(Some("")), None);
        assert_eq!(optional_trimmed(Some("  ")), None);
        assert_eq!(optional_trimmed(Some(" note ")), Some("note".to_string()));
        assert_eq!(optional_trimmed(None), None);
    }
}
