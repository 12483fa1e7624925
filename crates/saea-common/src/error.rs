//! Error types for the arena
//!
//! The ledger's rejection taxonomy

use thiserror::Error;

/// Rejections returned by the ledger for a single transition call.
///
/// Each call either commits in full or fails with one of these; the ledger
/// never applies a call partially.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unauthorized: caller is not the owner")]
    Unauthorized,

    #[error("Arena is already initialized")]
    ArenaAlreadyInitialized,

    #[error("Arena not found")]
    ArenaNotFound,

    #[error("Arena is not active")]
    ArenaNotActive,

    #[error("Maximum number of agents reached: {max}")]
    MaxAgentsReached { max: u64 },

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent is not active")]
    AgentNotActive,

    #[error("Invalid genome length {len} (must be 1-{max} bytes)")]
    InvalidGenomeLength { len: usize, max: usize },

    #[error("Agent index mismatch: expected {expected}, got {actual}")]
    IndexMismatch { expected: u64, actual: u64 },

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Round {0} not found")]
    RoundNotFound(u64),

    #[error("Round is already complete")]
    RoundAlreadyComplete,

    #[error("Agent already participated in this round")]
    AlreadyParticipated,

    #[error("Invalid round number: expected {expected}, got {actual}")]
    InvalidRoundNumber { expected: u64, actual: u64 },

    #[error("Agent fitness is above pruning threshold: {fitness} >= {threshold}")]
    AgentAboveThreshold { fitness: u64, threshold: u64 },

    #[error("Mutation rate must be between 0 and 10000 basis points, got {0}")]
    InvalidMutationRate(u16),

    #[error("Max agents must be at least 2, got {0}")]
    InvalidMaxAgents(u64),

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl LedgerError {
    /// Whether the ledger rejected the call on its own invariants, as opposed
    /// to the call never reaching it.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::Transport(_))
    }
}
