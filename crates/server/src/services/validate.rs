//! Input validation helpers.
//!
//! All text reaching the Record Store goes through these: required fields
//! must be non-empty after trimming, and optional fields collapse to `None`
//! when blank. Validation always runs before the first store call, so a
//! rejected input never causes a partial write.

use super::{ActionError, ActionResult};

/// Trim a required text field, rejecting blank input with `message`.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] when the trimmed value is empty.
pub fn required_trimmed(value: &str, message: &str) -> ActionResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActionError::Validation(message.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional text field, collapsing blank input to `None`.
#[must_use]
pub fn optional_trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_whitespace() {
        assert_eq!(
            required_trimmed("  John Doe  ", "Name is required"),
            Ok("John Doe".to_owned())
        );
    }

    #[test]
    fn test_required_rejects_empty() {
        assert_eq!(
            required_trimmed("", "Name is required"),
            Err(ActionError::Validation("Name is required".to_owned()))
        );
    }

    #[test]
    fn test_required_rejects_whitespace_only() {
        assert_eq!(
            required_trimmed("   \t\n", "Title is required"),
            Err(ActionError::Validation("Title is required".to_owned()))
        );
    }

    #[test]
    fn test_optional_collapses_blank_to_none() {
        assert_eq!(optional_trimmed(None), None);
        assert_eq!(optional_trimmed(Some("")), None);
        assert_eq!(optional_trimmed(Some("   ")), None);
        assert_eq!(
            optional_trimmed(Some("  Acme Corp ")),
            Some("Acme Corp".to_owned())
        );
    }
}
