//! Fixture loading and management.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HarnessError;

/// Family selector for a by-name query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilySpec {
    Inet,
    Inet6,
    /// IPv6 first, IPv4 on miss.
    Any,
}

/// Query as written in a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuerySpec {
    Name { name: String, family: FamilySpec },
    Address { addr: String },
}

/// Expected lookup result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    /// `SUCCESS`, `NOTFOUND`, `TRYAGAIN` or `UNAVAIL`.
    pub status: String,
    /// Expected errno on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Hosts file contents the query runs against.
    pub hosts: String,
    pub query: QuerySpec,
    /// host.conf `multi` setting.
    #[serde(default)]
    pub multi: bool,
    /// Caller buffer size in bytes.
    pub buflen: usize,
    pub expected: Expectation,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Free-form label for the set.
    pub family: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        Ok(Self::load_with_digest(path)?.0)
    }

    /// Load a fixture set together with the SHA-256 of the file bytes.
    pub fn load_with_digest(path: &Path) -> Result<(Self, String), HarnessError> {
        let raw = std::fs::read(path).map_err(|source| HarnessError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set: Self = serde_json::from_slice(&raw)?;
        if set.cases.is_empty() {
            return Err(HarnessError::EmptyFixture {
                path: path.to_path_buf(),
            });
        }
        Ok((set, sha256_hex(&raw)))
    }
}

pub(crate) fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex_lower(&Sha256::digest(data))
}
