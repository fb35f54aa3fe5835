//! API version definitions.
//!
//! This module provides the [`ApiVersion`] type used to build the versioned
//! segment of the API base URL (e.g., `v5_0`).

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// API version, rendered as the `v{major}_{minor}` URL segment.
///
/// Versions can be parsed from the dotted form (`"5.0"`), the URL form
/// (`"v5_0"`), or a bare major number (`"6"`, which means `6.0`).
///
/// # Example
///
/// ```rust
/// use rest_resource::ApiVersion;
///
/// let version: ApiVersion = "5.0".parse().unwrap();
/// assert_eq!(version.to_string(), "v5_0");
///
/// let version: ApiVersion = "v6".parse().unwrap();
/// assert_eq!(version, ApiVersion::new(6, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    major: u32,
    minor: u32,
}

impl ApiVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}_{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidApiVersion {
            version: s.to_string(),
        };

        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let mut parts = digits.splitn(2, ['.', '_']);
        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            None => 0,
            Some(p) => p.parse::<u32>().map_err(|_| invalid())?,
        };

        Ok(Self { major, minor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_and_url_forms() {
        assert_eq!("5.0".parse::<ApiVersion>().unwrap(), ApiVersion::new(5, 0));
        assert_eq!("v5_0".parse::<ApiVersion>().unwrap(), ApiVersion::new(5, 0));
        assert_eq!("V4.1".parse::<ApiVersion>().unwrap(), ApiVersion::new(4, 1));
        assert_eq!("6".parse::<ApiVersion>().unwrap(), ApiVersion::new(6, 0));
    }

    #[test]
    fn test_display_uses_url_segment_form() {
        assert_eq!(ApiVersion::new(5, 0).to_string(), "v5_0");
        assert_eq!(ApiVersion::new(6, 2).to_string(), "v6_2");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "v", "five", "5.x", "5.0.1", "v_1"] {
            assert!(
                matches!(
                    bad.parse::<ApiVersion>(),
                    Err(ConfigError::InvalidApiVersion { .. })
                ),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_versions_are_ordered() {
        assert!(ApiVersion::new(5, 0) < ApiVersion::new(6, 0));
        assert!(ApiVersion::new(4, 1) > ApiVersion::new(4, 0));
    }
}
