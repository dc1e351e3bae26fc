//! Field checks shared by the editors.

use std::fmt::Display;

use crate::error::ValidationError;

/// Reject empty or whitespace-only text.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Reject values outside `min..=max`. NaN is always out of range.
pub fn check_range<T>(field: &'static str, value: T, min: T, max: T) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
        })
    }
}

/// Parse free-form JSON typed into a form field. Blank input is missing input.
pub fn parse_document(field: &'static str, text: &str) -> Result<serde_json::Value, ValidationError> {
    require(field, text)?;
    serde_json::from_str(text).map_err(|e| ValidationError::InvalidJson {
        field,
        reason: e.to_string(),
    })
}

/// Like [`parse_document`], but the document must be a JSON object.
pub fn parse_object(field: &'static str, text: &str) -> Result<serde_json::Value, ValidationError> {
    let value = parse_document(field, text)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ValidationError::NotAnObject(field))
    }
}

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic shape check: `local@domain.tld`, no whitespace, one `@`.
pub fn check_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_owned());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn require_rejects_blank() {
        assert_eq!(require("name", "  "), Err(ValidationError::Required("name")));
        assert!(require("name", "Saver").is_ok());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(check_range("points", 0, 0, 100).is_ok());
        assert!(check_range("points", 100, 0, 100).is_ok());
        assert_eq!(
            check_range("points", 101, 0, 100),
            Err(ValidationError::OutOfRange {
                field: "points",
                min: "0".into(),
                max: "100".into(),
            })
        );
        assert!(check_range("rate", f64::NAN, 0.0, 100.0).is_err());
    }

    #[test]
    fn documents() {
        assert_eq!(parse_document("rule_value", "[1, 2]").unwrap(), json!([1, 2]));
        assert!(matches!(
            parse_document("rule_value", "{min: 1}"),
            Err(ValidationError::InvalidJson { field: "rule_value", .. })
        ));
        assert_eq!(
            parse_document("rule_value", ""),
            Err(ValidationError::Required("rule_value"))
        );
        assert_eq!(
            parse_object("criteria", "[]"),
            Err(ValidationError::NotAnObject("criteria"))
        );
        assert_eq!(
            parse_object("criteria", r#"{"deposits": 3}"#).unwrap(),
            json!({"deposits": 3})
        );
    }

    #[test]
    fn emails() {
        assert_eq!(normalize_email("  Ops@Example.COM "), "ops@example.com");
        assert!(check_email("ops@example.com").is_ok());
        for bad in ["ops", "@example.com", "ops@", "ops@example", "o ps@example.com", "a@b@c.com", "ops@.com"] {
            assert!(check_email(bad).is_err(), "{bad} should be rejected");
        }
    }
}
