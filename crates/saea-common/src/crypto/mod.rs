//! Cryptographic primitives for the arena
//!
//! This module provides:
//! - Genome content hashing for reporting and lineage
//! - Deterministic account address derivation

pub mod digest;

pub use digest::{content_hash, derive_address, GenomeDigest};
