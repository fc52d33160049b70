use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RatchetError, Result};

/// A `major.minor.patch` version that migrations are tagged with.
///
/// Ordering is lexicographic over the three components, so `1.10.0 > 1.9.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVersion {
    /// The zero version, used as the starting point of a fresh store.
    pub const ZERO: SemVersion = SemVersion::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Shorthand for `major.0.0`.
    pub const fn major(major: u64) -> Self {
        Self::new(major, 0, 0)
    }

    /// Parse a version string.
    ///
    /// Accepts one to three dot-separated numeric components with an optional
    /// leading `v`; missing components default to zero.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
        if body.is_empty() {
            return Err(RatchetError::InvalidVersion(s.to_string()));
        }

        let mut parts = [0u64; 3];
        let mut count = 0;
        for component in body.split('.') {
            if count == 3 {
                return Err(RatchetError::InvalidVersion(s.to_string()));
            }
            parts[count] = component
                .parse()
                .map_err(|_| RatchetError::InvalidVersion(s.to_string()))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for SemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVersion {
    type Err = RatchetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemVersion {
    type Error = RatchetError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SemVersion> for String {
    fn from(version: SemVersion) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_and_partial() {
        assert_eq!(SemVersion::parse("1.2.3").unwrap(), SemVersion::new(1, 2, 3));
        assert_eq!(SemVersion::parse("1.2").unwrap(), SemVersion::new(1, 2, 0));
        assert_eq!(SemVersion::parse("7").unwrap(), SemVersion::major(7));
        assert_eq!(SemVersion::parse("v2.0.1").unwrap(), SemVersion::new(2, 0, 1));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SemVersion::parse("").is_err());
        assert!(SemVersion::parse("1.2.3.4").is_err());
        assert!(SemVersion::parse("1.x").is_err());
        assert!(SemVersion::parse("1..2").is_err());
        assert!(matches!(
            SemVersion::parse("abc"),
            Err(RatchetError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_ordering_is_numeric_not_textual() {
        let v1_9 = SemVersion::new(1, 9, 3);
        let v1_10 = SemVersion::new(1, 10, 0);
        let v2 = SemVersion::major(2);

        assert!(v1_9 < v1_10);
        assert!(v1_10 < v2);
        assert!(v1_9 < v2);
        assert_eq!(v1_10.cmp(&SemVersion::parse("1.10").unwrap()), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        let version = SemVersion::new(3, 14, 15);
        assert_eq!(version.to_string(), "3.14.15");
        assert_eq!(version.to_string().parse::<SemVersion>().unwrap(), version);
    }

    #[test]
    fn test_serde_uses_string_form() {
        #[derive(Deserialize)]
        struct Wrapper {
            version: SemVersion,
        }

        let parsed: Wrapper = toml::from_str(r#"version = "1.4""#).unwrap();
        assert_eq!(parsed.version, SemVersion::new(1, 4, 0));

        let bad: std::result::Result<Wrapper, _> = toml::from_str(r#"version = "one""#);
        assert!(bad.is_err());
    }
}
