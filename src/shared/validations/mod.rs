//! Field validators shared by the catalog, the registry and the ledgers.

use crate::shared::types::{DomainError, DomainResult};

/// Trim `value` and reject it when nothing is left.
pub fn require_text(field: &'static str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free-text field, mapping blank input to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Key under which names are compared: trimmed and lower-cased.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// ISO 3779 VIN: 17 characters, digits and capital letters except I, O, Q.
pub fn validate_vin(vin: &str) -> DomainResult<String> {
    let vin = vin.trim().to_uppercase();
    let valid = vin.len() == 17
        && vin
            .chars()
            .all(|c| c.is_ascii_digit() || (c.is_ascii_uppercase() && !matches!(c, 'I' | 'O' | 'Q')));
    if !valid {
        return Err(DomainError::validation(
            "vin",
            format!("'{}' is not a 17 character VIN", vin),
        ));
    }
    Ok(vin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("name", "   ").is_err());
        assert_eq!(require_text("name", " Toyota ").unwrap(), "Toyota");
    }

    #[test]
    fn name_key_is_case_insensitive() {
        assert_eq!(name_key(" ToYoTa"), name_key("toyota "));
    }

    #[test]
    fn vin_alphabet() {
        assert_eq!(validate_vin("1hgcm82633a004352").unwrap(), "1HGCM82633A004352");
        assert!(validate_vin("1HGCM82633A00435").is_err());
        assert!(validate_vin("1HGCM82633A00435O").is_err());
    }
}
