//! Error types for evolution runs
//!
//! A run fails either during setup (arena bootstrap, population seeding) or
//! in the middle of a generation. Per-agent failures never surface here; they
//! are counted in the generation report instead.

use saea_common::LedgerError;
use thiserror::Error;

use crate::genome::OperatorError;

/// Result type alias using EvolutionError
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Run-terminating errors
#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error("Setup failure: {0}")]
    Setup(#[from] SetupError),

    #[error("Mid-generation failure in generation {generation}: {source}")]
    Generation {
        generation: u64,
        #[source]
        source: GenerationError,
    },

    #[error("Leaderboard read failed: {0}")]
    Leaderboard(#[source] LedgerError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EvolutionError {
    /// Whether the run failed before the first generation started
    pub fn is_setup(&self) -> bool {
        matches!(self, EvolutionError::Setup(_) | EvolutionError::InvalidConfig(_))
    }
}

/// Failures while bootstrapping the arena and seeding the population
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Arena not found after bootstrap")]
    ArenaNotFound,

    #[error("Arena read failed: {0}")]
    ArenaRead(#[source] LedgerError),

    #[error("Arena initialization failed: {0}")]
    Initialize(#[source] LedgerError),

    #[error("Registration of agent index {index} failed: {source}")]
    Register {
        index: u64,
        #[source]
        source: LedgerError,
    },
}

/// Failures that abort a generation
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Arena not found")]
    ArenaNotFound,

    #[error("Arena read failed: {0}")]
    ArenaRead(#[source] LedgerError),

    #[error("Round {round} could not start: {source}")]
    RoundStart {
        round: u64,
        #[source]
        source: LedgerError,
    },

    #[error("Round {round} could not complete: {source}")]
    RoundComplete {
        round: u64,
        #[source]
        source: LedgerError,
    },

    #[error("Generation advance failed: {0}")]
    Advance(#[source] LedgerError),

    #[error("Parent selection failed: {0}")]
    Selection(#[from] OperatorError),
}
