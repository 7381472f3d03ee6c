//! Migration version identifiers
//!
//! Versions look like `1.2`, `V1_2_3` or `1.2.0__add_status_column`. The
//! leading `V` and the `__comment` suffix are optional; the numeric parts are
//! separated by `.`, `_` or `-` and are compared numerically.
//!
//! Identifiers with a non-numeric part, such as `1.0-rc1` or `release-3`, are
//! kept as opaque text. They sort after every numeric version and compare
//! with each other by text.

use crate::migration::{MigrationError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A parsed migration version.
#[derive(Debug, Clone)]
pub struct MigrationVersion {
    /// Version text without comment, and without the `V` prefix when numeric
    version: String,

    /// Numeric parts used for ordering, `None` for an opaque identifier
    parts: Option<Vec<u64>>,

    /// Text after `__`, empty when absent
    comment: String,
}

impl MigrationVersion {
    /// Parse a raw version string.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::InvalidVersion` when the version is empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (text, comment) = match trimmed.split_once("__") {
            Some((text, comment)) => (text, comment),
            None => (trimmed, ""),
        };

        let unprefixed = text
            .strip_prefix('V')
            .or_else(|| text.strip_prefix('v'))
            .unwrap_or(text);

        if unprefixed.is_empty() {
            return Err(MigrationError::InvalidVersion(raw.to_string()));
        }

        let parts = unprefixed
            .split(['.', '_', '-'])
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>();

        let version = if parts.is_some() { unprefixed } else { text };
        Ok(Self {
            version: version.to_string(),
            parts,
            comment: comment.to_string(),
        })
    }

    /// The version text as supplied, without comment.
    ///
    /// The `V` prefix is dropped from numeric versions only.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.version
    }

    /// The numeric parts joined with `.`, or the text of an opaque version.
    #[must_use]
    pub fn normalised(&self) -> String {
        match &self.parts {
            Some(parts) => parts
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join("."),
            None => self.version.clone(),
        }
    }

    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    #[must_use]
    pub fn parts(&self) -> Option<&[u64]> {
        self.parts.as_deref()
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.parts.is_some()
    }
}

impl PartialEq for MigrationVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MigrationVersion {}

impl Hash for MigrationVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.parts {
            Some(parts) => parts.hash(state),
            None => self.version.hash(state),
        }
    }
}

impl PartialOrd for MigrationVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MigrationVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parts, &other.parts) {
            (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.version.cmp(&other.version),
        }
    }
}

impl fmt::Display for MigrationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

impl std::str::FromStr for MigrationVersion {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_prefix_and_comment() {
        let version = MigrationVersion::parse("V1_2__add_status").unwrap();
        assert_eq!(version.as_str(), "1_2");
        assert_eq!(version.normalised(), "1.2");
        assert_eq!(version.comment(), "add_status");
        assert_eq!(version.parts(), Some(&[1, 2][..]));
        assert!(version.is_numeric());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            MigrationVersion::parse(""),
            Err(MigrationError::InvalidVersion(_))
        ));
        assert!(MigrationVersion::parse("   ").is_err());
        assert!(MigrationVersion::parse("V__comment").is_err());
    }

    #[test]
    fn test_parse_keeps_non_numeric_as_opaque() {
        for raw in ["1.0-rc1", "release-3", "2024.01.15a", "1.x"] {
            let version = MigrationVersion::parse(raw).unwrap();
            assert!(!version.is_numeric(), "{raw}");
            assert_eq!(version.parts(), None);
            assert_eq!(version.as_str(), raw);
            assert_eq!(version.normalised(), raw);
        }

        let version = MigrationVersion::parse("Vnext-hotfix__urgent").unwrap();
        assert_eq!(version.as_str(), "Vnext-hotfix");
        assert_eq!(version.comment(), "urgent");
    }

    #[test]
    fn test_ordering_is_numeric() {
        let v1_2 = MigrationVersion::parse("1.2").unwrap();
        let v1_10 = MigrationVersion::parse("1.10").unwrap();
        let v1_2_1 = MigrationVersion::parse("1.2.1").unwrap();
        assert!(v1_2 < v1_10);
        assert!(v1_2 < v1_2_1);
        assert!(v1_2_1 < v1_10);
    }

    #[test]
    fn test_opaque_versions_sort_after_numeric() {
        let numeric = MigrationVersion::parse("99.0").unwrap();
        let release_a = MigrationVersion::parse("release-a").unwrap();
        let release_b = MigrationVersion::parse("release-b").unwrap();
        assert!(numeric < release_a);
        assert!(release_a < release_b);
        assert_eq!(release_a, MigrationVersion::parse("release-a__note").unwrap());
        assert_ne!(release_a, MigrationVersion::parse("Release-a").unwrap());
    }

    #[test]
    fn test_equality_ignores_separators() {
        let dotted = MigrationVersion::parse("1.1").unwrap();
        let underscored = MigrationVersion::parse("V1_1__comment").unwrap();
        assert_eq!(dotted, underscored);
    }
}
