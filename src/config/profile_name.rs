//! Validated profile and authenticator names.
//!
//! Profile and authenticator names become file names under the config
//! directory, so they are restricted to a safe character set before any
//! path is built from them.

use crate::error::Error;
use std::fmt;

/// Maximum allowed length for a profile or authenticator name.
const MAX_NAME_LENGTH: usize = 64;

/// A validated profile (or authenticator) name.
///
/// # Naming Rules
///
/// - Must start with an ASCII letter or digit
/// - May contain only ASCII letters, digits, dots (`.`), hyphens (`-`), or underscores (`_`)
/// - Maximum length: 64 characters
/// - No path separators, no leading dots, no whitespace
///
/// # Examples
///
/// ```
/// use portico::config::profile_name::ProfileName;
///
/// // Valid names
/// assert!(ProfileName::new("default").is_ok());
/// assert!(ProfileName::new("prod_eu").is_ok());
/// assert!(ProfileName::new("team.ops").is_ok());
///
/// // Invalid names
/// assert!(ProfileName::new("../foo").is_err());
/// assert!(ProfileName::new("foo/bar").is_err());
/// assert!(ProfileName::new(".hidden").is_err());
/// assert!(ProfileName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileName(String);

impl ProfileName {
    /// Validates a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name:
    /// - Is empty
    /// - Exceeds 64 characters
    /// - Does not start with an ASCII letter or digit
    /// - Contains characters other than ASCII letters, digits, `.`, `-`, or `_`
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::invalid_profile_name(
                name,
                "name cannot be empty",
            ));
        }

        if name.len() > MAX_NAME_LENGTH {
            return Err(Error::invalid_profile_name(
                name,
                format!(
                    "name exceeds maximum length of {MAX_NAME_LENGTH} characters ({} given)",
                    name.len()
                ),
            ));
        }

        let first = name.as_bytes()[0];
        if !first.is_ascii_alphanumeric() {
            return Err(Error::invalid_profile_name(
                name,
                "name must start with an ASCII letter or digit",
            ));
        }

        if let Some(invalid) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-' && *c != '_')
        {
            return Err(Error::invalid_profile_name(
                name,
                format!("contains invalid character '{invalid}'"),
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Returns the validated name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_path_traversal() {
        assert!(ProfileName::new("../etc").is_err());
        assert!(ProfileName::new("a/b").is_err());
        assert!(ProfileName::new(".hidden").is_err());
        assert!(ProfileName::new("").is_err());
        assert!(ProfileName::new(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_error_names_offending_character() {
        let err = ProfileName::new("dev profile").unwrap_err();
        assert!(err.to_string().contains("invalid character ' '"));
    }
}
