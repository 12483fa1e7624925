//! # SAEA Common
//!
//! Shared types, errors, and digests for the Autonomous Evolution Arena.
//!
//! ## Core Types
//!
//! - [`Identity`]: 32-byte public identity (owners, authorities, agent handles)
//! - [`Arena`]: singleton arena record mirrored from the ledger
//! - [`Agent`]: one registered population member
//! - [`Round`]: one fitness-evaluation cycle
//!
//! ## Crypto
//!
//! - [`crypto::digest`]: genome content hashing and address derivation
//!
//! Every record here is a point-in-time copy of ledger state. The ledger owns
//! the canonical version; nothing in this crate mutates it remotely.

pub mod crypto;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use crypto::digest::{content_hash, derive_address, GenomeDigest};
pub use error::LedgerError;
pub use types::{
    agent::{Agent, AgentHandle},
    arena::Arena,
    identity::Identity,
    round::Round,
};

/// SAEA version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum genome length accepted by the ledger (bytes)
pub const MAX_GENOME_LEN: usize = 32;

/// Basis-point denominator (10000 bps = 100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Upper bound of a ledger-held mutation rate
pub const MAX_MUTATION_RATE_BPS: u16 = 10_000;

/// Smallest arena the ledger accepts
pub const MIN_MAX_AGENTS: u64 = 2;
