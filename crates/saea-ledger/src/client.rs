//! Ledger client capability
//!
//! The ledger is the source of truth for arena, agent and round state. A
//! client can only read snapshots and request discrete transitions; each
//! transition commits in full or fails with a [`LedgerError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use saea_common::{Agent, AgentHandle, Arena, LedgerError, Round};

/// Result alias for ledger calls
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Identifier of a confirmed transition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads and state transitions offered by the arena ledger.
///
/// Writes are authenticated by the client's signer identity. Calls are
/// independent: there is no multi-call atomicity and no exactly-once
/// delivery.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Arena snapshot, `None` before initialization
    async fn get_arena(&self) -> LedgerResult<Option<Arena>>;

    /// Create the arena; fails if it already exists
    async fn initialize_arena(
        &self,
        max_agents: u64,
        min_fitness_threshold: u64,
        mutation_rate_bps: u16,
    ) -> LedgerResult<TransactionId>;

    /// Register a genome in the slot `index`, owned by the signer
    async fn register_agent(
        &self,
        genome: Vec<u8>,
        index: u64,
    ) -> LedgerResult<(TransactionId, AgentHandle)>;

    /// Replace an agent's genome and record its lineage parent
    async fn submit_genome(
        &self,
        agent: AgentHandle,
        new_genome: Vec<u8>,
        lineage_parent: AgentHandle,
    ) -> LedgerResult<TransactionId>;

    /// Start round `round_number`; must be exactly one past the current round
    async fn run_round(&self, round_number: u64) -> LedgerResult<TransactionId>;

    /// Score one agent in an open round
    async fn score_agent(&self, agent: AgentHandle, round_number: u64)
        -> LedgerResult<TransactionId>;

    /// Seal a round
    async fn complete_round(&self, round_number: u64) -> LedgerResult<TransactionId>;

    /// Deactivate an agent whose fitness is below the arena threshold
    async fn prune_agent(&self, agent: AgentHandle) -> LedgerResult<TransactionId>;

    /// Move the arena to the next generation
    async fn advance_generation(&self) -> LedgerResult<TransactionId>;

    async fn get_agent(&self, handle: AgentHandle) -> LedgerResult<Option<Agent>>;

    async fn get_round(&self, round_number: u64) -> LedgerResult<Option<Round>>;

    /// Every agent account in the arena, active or not
    async fn get_all_agents(&self) -> LedgerResult<Vec<Agent>>;

    /// Best-effort funding of the signer; not authoritative
    async fn request_funding(&self, amount: u64) -> LedgerResult<()>;
}
