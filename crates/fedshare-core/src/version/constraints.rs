//! Required-version parsing and matching
//!
//! A consumer states which versions of a shared package it accepts. The
//! requirement is either an exact version, a semver range, or the `auto`
//! sentinel which accepts only the consumer's own version.

use std::fmt;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// Version requirement attached to a dependency declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RequiredVersion {
    /// Accept only the version the consumer declares itself
    #[default]
    Auto,

    /// Exact version (e.g., "3.0.0")
    Exact(Version),

    /// Semantic version requirement (e.g., "^20.0.0", "~7.8.0")
    Range(VersionReq),
}

impl RequiredVersion {
    /// Parse a required version string
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();

        if input.is_empty() || input.eq_ignore_ascii_case("auto") {
            return Ok(RequiredVersion::Auto);
        }

        // Exact first: VersionReq would read "3.0.0" as "^3.0.0"
        if let Ok(version) = Version::parse(input.trim_start_matches('=')) {
            return Ok(RequiredVersion::Exact(version));
        }

        if let Ok(req) = VersionReq::parse(input) {
            return Ok(RequiredVersion::Range(req));
        }

        anyhow::bail!("Invalid required version: {}", input)
    }

    /// Check whether `bound` satisfies this requirement for a consumer that
    /// declares `own` itself.
    pub fn accepts(&self, bound: &Version, own: &Version) -> bool {
        match self {
            RequiredVersion::Auto => bound == own,
            RequiredVersion::Exact(version) => bound == version,
            RequiredVersion::Range(req) => req.matches(bound),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, RequiredVersion::Auto)
    }
}

impl fmt::Display for RequiredVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredVersion::Auto => f.write_str("auto"),
            RequiredVersion::Exact(version) => write!(f, "{}", version),
            RequiredVersion::Range(req) => write!(f, "{}", req),
        }
    }
}

impl TryFrom<String> for RequiredVersion {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RequiredVersion::parse(&value)
    }
}

impl From<RequiredVersion> for String {
    fn from(value: RequiredVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parses_auto_exact_and_range() {
        assert_eq!(RequiredVersion::parse("auto").unwrap(), RequiredVersion::Auto);
        assert_eq!(RequiredVersion::parse("").unwrap(), RequiredVersion::Auto);
        assert_eq!(
            RequiredVersion::parse("3.0.0").unwrap(),
            RequiredVersion::Exact(v("3.0.0"))
        );
        assert!(matches!(
            RequiredVersion::parse("^20.0.0").unwrap(),
            RequiredVersion::Range(_)
        ));
        assert!(RequiredVersion::parse("not a version").is_err());
    }

    #[test]
    fn exact_requirement_matches_only_that_version() {
        let required = RequiredVersion::parse("1.0.0").unwrap();
        assert!(required.accepts(&v("1.0.0"), &v("1.0.0")));
        assert!(!required.accepts(&v("3.0.0"), &v("1.0.0")));
    }

    #[test]
    fn range_requirement_matches_compatible_versions() {
        let required = RequiredVersion::parse("^20.0.0").unwrap();
        assert!(required.accepts(&v("20.1.3"), &v("20.0.0")));
        assert!(!required.accepts(&v("21.0.0"), &v("20.0.0")));
    }

    #[test]
    fn auto_requirement_matches_own_version() {
        let required = RequiredVersion::Auto;
        assert!(required.accepts(&v("2.0.0"), &v("2.0.0")));
        assert!(!required.accepts(&v("3.0.0"), &v("2.0.0")));
    }

    #[test]
    fn display_matches_parsed_input() {
        assert_eq!(RequiredVersion::Auto.to_string(), "auto");
        assert_eq!(RequiredVersion::parse("3.0.0").unwrap().to_string(), "3.0.0");
    }
}
