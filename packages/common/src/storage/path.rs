use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

const MAX_PATH_LEN: usize = 512;

/// A relative, slash-separated blob path such as `design_documents/spec.pdf`.
///
/// Guaranteed to stay inside the store root: no absolute paths, no `..`,
/// no hidden segments, no backslashes or control characters.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlobPath(String);

impl BlobPath {
    pub fn parse(path: &str) -> Result<Self, StorageError> {
        let invalid = |msg: &str| Err(StorageError::InvalidPath(format!("{msg}: {path:?}")));

        if path.is_empty() {
            return invalid("path is empty");
        }
        if path.len() > MAX_PATH_LEN {
            return invalid("path is too long");
        }
        if path.starts_with('/') {
            return invalid("path must be relative");
        }
        if path.chars().any(|c| c.is_control() || c == '\\') {
            return invalid("path contains a backslash or control character");
        }
        for segment in path.split('/') {
            if segment.is_empty() {
                return invalid("path contains an empty segment");
            }
            if segment.starts_with('.') {
                return invalid("path segment starts with '.'");
            }
        }

        Ok(Self(path.to_string()))
    }

    /// Join a directory prefix and a single file name.
    pub fn join(dir: &str, file_name: &str) -> Result<Self, StorageError> {
        if file_name.contains('/') {
            return Err(StorageError::InvalidPath(format!(
                "file name contains '/': {file_name:?}"
            )));
        }
        Self::parse(&format!("{dir}/{file_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, for mapping onto a filesystem.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Debug for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobPath({})", self.0)
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BlobPath {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BlobPath> for String {
    fn from(path: BlobPath) -> Self {
        path.0
    }
}
