//! Fixture loading and management.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::decode::SectionRecord;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Format string; may contain `\u0000` to test early termination.
    pub format: String,
    /// Argument specs in `kind:value` form.
    #[serde(default)]
    pub args: Vec<String>,
    /// errno in effect while decoding.
    #[serde(default)]
    pub errno: i32,
    /// Cargo features the case depends on.
    #[serde(default)]
    pub requires: Vec<String>,
    pub expected: Vec<SectionRecord>,
}

/// A collection of fixture cases for a function family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, FixtureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}

/// Lowercase hex SHA-256 of a file's bytes.
pub fn sha256_file(path: &Path) -> Result<String, FixtureError> {
    let data = std::fs::read(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(hex_lower(&Sha256::digest(&data)))
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_case_fields_default() {
        let set = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"stdio/printf",
                "captured_at":"2026-10-01T00:00:00Z",
                "cases":[{"name":"plain","format":"abc","expected":[{"raw":"abc","conv":null}]}]
            }"#,
        )
        .expect("valid fixture json");
        let case = &set.cases[0];
        assert!(case.args.is_empty());
        assert_eq!(case.errno, 0);
        assert!(case.requires.is_empty());
        assert_eq!(case.expected[0].conv, None);
        assert_eq!(case.expected[0].value, None);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = FixtureSet::from_json("{").unwrap_err();
        assert!(matches!(err, FixtureError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FixtureSet::from_file(Path::new("/nonexistent/printf.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/printf.json"));
    }

    #[test]
    fn hex_digest_is_lowercase() {
        assert_eq!(hex_lower(&[0xab, 0x01]), "ab01");
        assert_eq!(
            hex_lower(&Sha256::digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
