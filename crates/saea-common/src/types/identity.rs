//! Identity - 32-byte public identity for authorities, owners and accounts
//!
//! Displayed and serialized as base58, the way ledger addresses are usually
//! shown. The all-zero identity is the null reference ("no parent").

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identity length in bytes
pub const IDENTITY_LEN: usize = 32;

/// 32-byte public identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// The null identity
    pub const NULL: Identity = Identity([0u8; IDENTITY_LEN]);

    /// Wrap raw bytes
    pub const fn new(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Deterministic identity from an arbitrary seed phrase
    pub fn from_seed(seed: &[u8]) -> Self {
        Self(*blake3::hash(seed).as_bytes())
    }

    /// Raw bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Whether this is the null reference
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; IDENTITY_LEN]
    }

    /// Base58 rendering
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// First `len` characters of the base58 rendering, for log lines
    pub fn short(&self, len: usize) -> String {
        self.to_base58().chars().take(len).collect()
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_base58())
    }
}

/// Identity parse errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityParseError {
    #[error("Invalid base58: {0}")]
    InvalidBase58(String),

    #[error("Invalid identity length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| IdentityParseError::InvalidBase58(e.to_string()))?;
        let array: [u8; IDENTITY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdentityParseError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_roundtrip() {
        let id = Identity::from_seed(b"authority");
        let parsed: Identity = id.to_base58().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_null_identity() {
        assert!(Identity::NULL.is_null());
        assert!(!Identity::from_seed(b"x").is_null());
        assert_eq!(Identity::default(), Identity::NULL);
    }

    #[test]
    fn test_rejects_short_input() {
        let err = "3yZe7d".parse::<Identity>().unwrap_err();
        assert!(matches!(err, IdentityParseError::InvalidLength(_)));
    }

    #[test]
    fn test_serializes_as_string() {
        let id = Identity::from_seed(b"owner");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_base58()));
    }
}
