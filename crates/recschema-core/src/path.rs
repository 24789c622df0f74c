//! # Dotted Field Paths
//!
//! Registry names such as `address.postalCode` address a node in the
//! named registry tree. Segments are read left to right, one tree level
//! per segment, like a filesystem path with `.` as the separator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Segment separator for field paths.
pub const SEPARATOR: char = '.';

/// A validated, non-empty dotted path with no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(String);

impl FieldPath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPath`] if the path is empty or any
    /// segment between separators is empty (`"a..b"`, `".a"`, `"a."`).
    pub fn parse(path: impl Into<String>) -> Result<Self, CoreError> {
        let path = path.into();
        if path.is_empty() {
            return Err(CoreError::InvalidPath {
                path,
                reason: "path is empty".to_string(),
            });
        }
        if let Some(index) = path.split(SEPARATOR).position(str::is_empty) {
            return Err(CoreError::InvalidPath {
                reason: format!("segment {index} is empty"),
                path,
            });
        }
        Ok(Self(path))
    }

    /// The full dotted text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The final segment, usually the field name.
    pub fn leaf(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}

impl FromStr for FieldPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_nested_path() {
        let path = FieldPath::parse("address.postalCode").unwrap();
        assert_eq!(path.segments().collect::<Vec<_>>(), ["address", "postalCode"]);
        assert_eq!(path.depth(), 2);
        assert_eq!(path.leaf(), "postalCode");
    }

    #[test]
    fn test_single_segment() {
        let path: FieldPath = "zip".parse().unwrap();
        assert_eq!(path.depth(), 1);
        assert_eq!(path.leaf(), "zip");
        assert_eq!(path.to_string(), "zip");
    }

    #[test]
    fn test_empty_segments_rejected() {
        for bad in ["", ".", "a..b", ".a", "a."] {
            assert!(
                matches!(FieldPath::parse(bad), Err(CoreError::InvalidPath { .. })),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: FieldPath = serde_json::from_str("\"address.region\"").unwrap();
        assert_eq!(ok.as_str(), "address.region");
        assert!(serde_json::from_str::<FieldPath>("\"address..region\"").is_err());
    }

    proptest! {
        #[test]
        fn joined_segments_round_trip(segments in proptest::collection::vec("[a-zA-Z0-9_]{1,8}", 1..5)) {
            let text = segments.join(".");
            let path = FieldPath::parse(text.clone()).unwrap();
            prop_assert_eq!(path.as_str(), text.as_str());
            prop_assert_eq!(path.segments().collect::<Vec<_>>(), segments.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
