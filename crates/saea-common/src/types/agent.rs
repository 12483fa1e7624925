//! Agent - one candidate solution tracked across rounds and generations

use serde::{Deserialize, Serialize};

use super::identity::Identity;
use crate::crypto::digest::GenomeDigest;

/// Ledger address of an agent account
pub type AgentHandle = Identity;

/// Agent state as last observed on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Account address
    pub handle: AgentHandle,

    /// Registering identity; only the owner may replace the genome
    pub owner: Identity,

    /// Fixed-length genome
    pub genome: Vec<u8>,

    /// Fitness from the last round the agent was scored in
    pub fitness: u64,

    /// Generation in which the current genome was written
    pub generation: u64,

    /// Lineage parent (null for genesis agents)
    pub parent: Identity,

    /// Digest of the genome this one replaced
    pub parent_genome_hash: GenomeDigest,

    /// Number of genome replacements
    pub mutation_count: u64,

    /// Rounds this agent was scored in
    pub rounds_participated: u64,

    /// Fitness summed across all rounds
    pub total_fitness: u64,

    /// False once pruned
    pub is_active: bool,

    /// Registration time (Unix seconds)
    pub registered_at: i64,

    /// Last round this agent was scored in
    pub last_round: u64,
}

impl Agent {
    /// Mean fitness across all rounds participated
    pub fn average_fitness(&self) -> u64 {
        if self.rounds_participated == 0 {
            return 0;
        }
        self.total_fitness / self.rounds_participated
    }

    /// Whether the agent has a lineage parent
    pub fn is_genesis(&self) -> bool {
        self.parent.is_null()
    }
}
