use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Longest key accepted by any backend.
pub const MAX_KEY_LEN: usize = 1024;

/// A validated blob key.
///
/// Keys are `/`-separated segments. Every backend maps them onto its own
/// namespace (nested directories on disk, object names in a bucket), so the
/// rules below keep a key from escaping that namespace.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobKey(String);

impl BlobKey {
    /// Validate and wrap a key string.
    pub fn parse(s: impl Into<String>) -> Result<Self, StorageError> {
        let s = s.into();

        if s.is_empty() {
            return Err(StorageError::InvalidKey("key must not be empty".into()));
        }
        if s.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key exceeds {MAX_KEY_LEN} bytes"
            )));
        }
        if s.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "key must not start with '/'".into(),
            ));
        }
        if s.contains('\\') {
            return Err(StorageError::InvalidKey(
                "key must not contain backslashes".into(),
            ));
        }
        if s.chars().any(|c| c.is_control()) {
            return Err(StorageError::InvalidKey(
                "key must not contain control characters".into(),
            ));
        }
        for segment in s.split('/') {
            match segment {
                "" => {
                    return Err(StorageError::InvalidKey(
                        "key must not contain empty segments".into(),
                    ));
                }
                "." | ".." => {
                    return Err(StorageError::InvalidKey(
                        "key must not contain '.' or '..' segments".into(),
                    ));
                }
                _ => {}
            }
        }

        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobKey({})", self.0)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for BlobKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlobKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}
