use chrono::NaiveDate;

use crate::error::ServiceError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_ID_LEN: usize = 64;
pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
pub const MAX_NAME_LEN: usize = 128;
pub const MAX_ADDRESS_LEN: usize = 256;
pub const MAX_POSTAL_CODE_LEN: usize = 16;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_MINIMUM_AGE: i64 = 150;

/// Returns the trimmed value of a required text field.
pub fn require_text(value: Option<&str>, field: &str, max_len: usize) -> Result<String, ServiceError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    check_length(trimmed, field, max_len)?;
    Ok(trimmed.to_string())
}

/// Ids are used as URL path segments: ASCII letters, digits, `-` and `_` only.
pub fn require_id(value: Option<&str>, field: &str) -> Result<String, ServiceError> {
    let id = require_text(value, field, MAX_ID_LEN)?;
    let path_safe = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !path_safe {
        return Err(ServiceError::validation(format!(
            "{field} may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(id)
}

/// Like [`require_text`], but an absent field stays absent. A present but
/// blank field is still rejected.
pub fn optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, ServiceError> {
    value
        .map(|raw| require_text(Some(raw), field, max_len))
        .transpose()
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ServiceError::validation(format!("{field} must be a date formatted YYYY-MM-DD"))
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_minimum_age(value: i64) -> Result<u32, ServiceError> {
    if !(0..=MAX_MINIMUM_AGE).contains(&value) {
        return Err(ServiceError::validation(format!(
            "minimum_age must be between 0 and {MAX_MINIMUM_AGE}"
        )));
    }
    // Bounded above.
    Ok(value as u32)
}

/// Emails are the login key and compare case-insensitively.
pub fn normalize_email(value: &str) -> Result<String, ServiceError> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ServiceError::validation("email is required"));
    }
    check_length(&normalized, "email", MAX_EMAIL_LEN)?;
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(normalized),
        _ => Err(ServiceError::validation("email is malformed")),
    }
}

fn check_length(value: &str, field: &str, max_len: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max_len {
        return Err(ServiceError::validation(format!(
            "{field} exceeds {max_len} character limit"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(require_text(Some("  Park  "), "title", 16).unwrap(), "Park");
        assert!(require_text(Some("   "), "title", 16).is_err());
        assert!(require_text(None, "title", 16).is_err());
        assert!(require_text(Some("abcdef"), "title", 3).is_err());
    }

    #[test]
    fn ids_must_be_path_safe() {
        assert_eq!(require_id(Some(" b-1_x "), "id").unwrap(), "b-1_x");
        for bad in ["a/b", "..", "a b", "abstimmung?1", "ä"] {
            assert!(
                matches!(require_id(Some(bad), "id"), Err(ServiceError::Validation(_))),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn optional_text_keeps_absence() {
        assert_eq!(optional_text(None, "title", 16).unwrap(), None);
        assert!(optional_text(Some(""), "title", 16).is_err());
    }

    #[test]
    fn date_roundtrip() {
        let date = parse_date("2024-01-31", "deadline").unwrap();
        assert_eq!(format_date(date), "2024-01-31");
        assert!(parse_date("31.01.2024", "deadline").is_err());
    }

    #[test]
    fn minimum_age_bounds() {
        assert_eq!(parse_minimum_age(18).unwrap(), 18);
        assert!(parse_minimum_age(-1).is_err());
        assert!(parse_minimum_age(MAX_MINIMUM_AGE + 1).is_err());
    }

    #[test]
    fn email_normalization() {
        assert_eq!(
            normalize_email(" Anna.Meier@Example.DE ").unwrap(),
            "anna.meier@example.de"
        );
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.de").is_err());
    }
}
