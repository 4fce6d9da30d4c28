//! # Input Validation
//!
//! Checks applied to user input before any remote call:
//!
//! - Category names
//! - Nested subfolder paths and repository paths
//! - Six-digit verification codes
//!
//! ## Usage
//!
//! ```rust
//! use repopix_core::validation::validate_category_name;
//!
//! assert!(validate_category_name("Pets").is_ok());
//! assert!(validate_category_name("a/b").is_err());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::category::{LEGACY_MARKER_FILE, MARKER_FILE, UNCATEGORIZED};

/// Exactly six ASCII digits.
pub static VERIFICATION_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("Invalid regex"));

/// Maximum length of a category name.
pub const MAX_NAME_LENGTH: usize = 100;
/// Maximum length of a repository path.
pub const MAX_PATH_LENGTH: usize = 4096;

fn error(code: &'static str, message: impl Into<String>) -> ValidationError {
    let message: String = message.into();
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validate a category name (already trimmed).
pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(error("length", "Category name cannot be empty"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(error(
            "length",
            format!("Category name must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }

    if name.contains(['/', '\\', '\0']) {
        return Err(error(
            "pattern",
            "Category name cannot contain slashes or null bytes",
        ));
    }

    if name == "." || name == ".." {
        return Err(error("pattern", "Category name cannot be '.' or '..'"));
    }

    if name == MARKER_FILE
        || name == LEGACY_MARKER_FILE
        || name.to_lowercase() == UNCATEGORIZED.to_lowercase()
    {
        return Err(error("reserved", "This name is reserved and cannot be used"));
    }

    Ok(())
}

/// Validate a repository path or nested subfolder path.
pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(error(
            "length",
            format!("Path must be at most {MAX_PATH_LENGTH} characters"),
        ));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(error("security", "Path cannot contain '..' segments"));
    }

    if path.contains('\0') {
        return Err(error("security", "Path cannot contain null bytes"));
    }

    Ok(())
}

/// Validate a six-digit verification code.
///
/// Only the shape is checked; there is no one-time-password secret behind it.
pub fn validate_verification_code(code: &str) -> Result<(), ValidationError> {
    if !VERIFICATION_CODE_REGEX.is_match(code) {
        return Err(error("pattern", "Verification code must be six digits"));
    }
    Ok(())
}
