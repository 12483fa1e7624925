//! Arena - singleton record governing one evolutionary run

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Arena state as last observed on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    /// Identity allowed to drive rounds, pruning and generation advances
    pub authority: Identity,

    /// Last round started (0 before the first round)
    pub current_round: u64,

    /// Current generation (starts at 1)
    pub current_generation: u64,

    /// Agents ever registered
    pub total_agents: u64,

    /// Agents not yet pruned
    pub active_agents: u64,

    /// Registration cap
    pub max_agents: u64,

    /// Agents strictly below this fitness may be pruned
    pub min_fitness_threshold: u64,

    /// Mutation rate in basis points (0-10000)
    pub mutation_rate_bps: u16,

    /// Whether the arena accepts transitions
    pub is_active: bool,

    /// Reward pool balance
    pub reward_pool: u64,
}

impl Arena {
    /// Fresh arena as created by initialization
    pub fn new(
        authority: Identity,
        max_agents: u64,
        min_fitness_threshold: u64,
        mutation_rate_bps: u16,
    ) -> Self {
        Self {
            authority,
            current_round: 0,
            current_generation: 1,
            total_agents: 0,
            active_agents: 0,
            max_agents,
            min_fitness_threshold,
            mutation_rate_bps,
            is_active: true,
            reward_pool: 0,
        }
    }

    /// Round number the ledger will accept next
    #[inline]
    pub fn next_round(&self) -> u64 {
        self.current_round + 1
    }

    /// `active <= total <= max`
    pub fn counts_consistent(&self) -> bool {
        self.active_agents <= self.total_agents && self.total_agents <= self.max_agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_arena_defaults() {
        let arena = Arena::new(Identity::from_seed(b"auth"), 64, 500, 3000);
        assert_eq!(arena.current_round, 0);
        assert_eq!(arena.current_generation, 1);
        assert_eq!(arena.next_round(), 1);
        assert!(arena.is_active);
        assert!(arena.counts_consistent());
    }
}
