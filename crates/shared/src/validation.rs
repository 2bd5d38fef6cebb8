//! Common validation utilities.

use validator::ValidationError;

lazy_static::lazy_static! {
    static ref GROUP_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _.-]*$").unwrap();
}

/// Maximum length of a report group name.
pub const MAX_GROUP_NAME_LEN: usize = 100;

/// Validates a report group name used to filter the report listing.
pub fn validate_group_name(name: &str) -> Result<(), ValidationError> {
    if name.len() > MAX_GROUP_NAME_LEN {
        let mut err = ValidationError::new("group_name_length");
        err.message = Some("Group name must be at most 100 characters".into());
        return Err(err);
    }

    if GROUP_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        let mut err = ValidationError::new("group_name_format");
        err.message = Some(
            "Group name must start with a letter or digit and contain only letters, digits, spaces, '.', '_' or '-'"
                .into(),
        );
        Err(err)
    }
}

/// Validates that a report id is a positive integer.
pub fn validate_report_id(id: i64) -> Result<(), ValidationError> {
    if id > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("report_id_range");
        err.message = Some("Report id must be a positive integer".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_group_name() {
        assert!(validate_group_name("finance").is_ok());
        assert!(validate_group_name("Finance Q1-2024").is_ok());
        assert!(validate_group_name("ops.daily_runs").is_ok());
        assert!(validate_group_name("").is_err());
        assert!(validate_group_name(" leading").is_err());
        assert!(validate_group_name("semi;colon").is_err());
    }

    #[test]
    fn test_validate_group_name_too_long() {
        let name = "a".repeat(MAX_GROUP_NAME_LEN + 1);
        let err = validate_group_name(&name).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Group name must be at most 100 characters"
        );
    }

    #[test]
    fn test_validate_report_id() {
        assert!(validate_report_id(1).is_ok());
        assert!(validate_report_id(0).is_err());
        assert!(validate_report_id(-5).is_err());
    }
}
