//! Genome digests and address derivation
//!
//! Uses BLAKE3 for:
//! - Content hashing of genomes (reporting and lineage fingerprints)
//! - Deterministic account addresses derived from seed components
//!
//! Digests identify content; they are never used for access control.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::types::identity::Identity;

/// Hash size in bytes (BLAKE3 output)
pub const HASH_SIZE: usize = 32;

/// Content digest of a genome
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GenomeDigest([u8; HASH_SIZE]);

impl GenomeDigest {
    /// All-zero digest, used where no parent genome exists
    pub const ZERO: GenomeDigest = GenomeDigest([0u8; HASH_SIZE]);

    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First `len` hex characters, for log lines and decision entries
    pub fn short(&self, len: usize) -> String {
        let mut s = self.to_hex();
        s.truncate(len);
        s
    }
}

impl fmt::Display for GenomeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for GenomeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenomeDigest({})", self.short(16))
    }
}

impl Serialize for GenomeDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for GenomeDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let array: [u8; HASH_SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::invalid_length(bytes.len(), &"32 bytes"))?;
        Ok(Self(array))
    }
}

/// Deterministic content digest of a genome
pub fn content_hash(genome: &[u8]) -> GenomeDigest {
    GenomeDigest(*blake3::hash(genome).as_bytes())
}

/// Derive an account address from ordered seed components.
///
/// Each component is length-prefixed so `["ab", "c"]` and `["a", "bc"]`
/// never collide.
pub fn derive_address(seeds: &[&[u8]]) -> Identity {
    let mut hasher = blake3::Hasher::new();
    for seed in seeds {
        hasher.update(&(seed.len() as u64).to_le_bytes());
        hasher.update(seed);
    }
    Identity::new(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_deterministic() {
        let genome = vec![7u8; 16];
        assert_eq!(content_hash(&genome), content_hash(&genome.clone()));
        assert_ne!(content_hash(&genome), content_hash(&[7u8; 15]));
    }

    #[test]
    fn test_hex_rendering() {
        let digest = content_hash(b"genome");
        assert_eq!(digest.to_hex().len(), 64);
        assert_eq!(digest.short(8), digest.to_hex()[..8]);
    }

    #[test]
    fn test_derive_address_is_length_prefixed() {
        let a = derive_address(&[b"ab", b"c"]);
        let b = derive_address(&[b"a", b"bc"]);
        assert_ne!(a, b);
        assert_eq!(a, derive_address(&[b"ab", b"c"]));
    }

    #[test]
    fn test_digest_serde() {
        let digest = content_hash(&[1, 2, 3]);
        let json = serde_json::to_string(&digest).unwrap();
        let back: GenomeDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, back);
    }
}
