//! Round - one fitness-evaluation cycle, sealed on completion

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Round state as last observed on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub arena: Identity,
    pub round_number: u64,
    pub generation: u64,
    pub participants: u64,
    pub best_fitness: u64,
    /// `u64::MAX` until the first score lands; 0 if sealed with no participants
    pub worst_fitness: u64,
    pub average_fitness: u64,
    pub total_fitness: u64,
    /// Scoring seed, fixed when the round starts
    pub seed: [u8; 32],
    pub started_at: i64,
    pub completed_at: i64,
    pub is_complete: bool,
}

impl Round {
    /// Open round as created by "start round"
    pub fn open(
        arena: Identity,
        round_number: u64,
        generation: u64,
        seed: [u8; 32],
        started_at: i64,
    ) -> Self {
        Self {
            arena,
            round_number,
            generation,
            participants: 0,
            best_fitness: 0,
            worst_fitness: u64::MAX,
            average_fitness: 0,
            total_fitness: 0,
            seed,
            started_at,
            completed_at: 0,
            is_complete: false,
        }
    }
}
