//! Ledger events
//!
//! Every committed transition appends one event to the ledger journal.

use serde::{Deserialize, Serialize};

use saea_common::{GenomeDigest, Identity};

/// Events emitted by committed transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    ArenaInitialized {
        authority: Identity,
        max_agents: u64,
        mutation_rate_bps: u16,
    },
    AgentRegistered {
        agent: Identity,
        owner: Identity,
        genome_hash: GenomeDigest,
        generation: u64,
    },
    GenomeSubmitted {
        agent: Identity,
        genome_hash: GenomeDigest,
        generation: u64,
        mutation_count: u64,
        parent: Identity,
    },
    RoundStarted {
        round_number: u64,
        generation: u64,
    },
    AgentScored {
        agent: Identity,
        round_number: u64,
        fitness: u64,
        genome_hash: GenomeDigest,
    },
    RoundCompleted {
        round_number: u64,
        generation: u64,
        participants: u64,
        best_fitness: u64,
        average_fitness: u64,
    },
    AgentPruned {
        agent: Identity,
        fitness: u64,
        generation: u64,
    },
    GenerationAdvanced {
        old_generation: u64,
        new_generation: u64,
        active_agents: u64,
    },
}

impl LedgerEvent {
    /// Event name, as it appears in the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::ArenaInitialized { .. } => "ArenaInitialized",
            LedgerEvent::AgentRegistered { .. } => "AgentRegistered",
            LedgerEvent::GenomeSubmitted { .. } => "GenomeSubmitted",
            LedgerEvent::RoundStarted { .. } => "RoundStarted",
            LedgerEvent::AgentScored { .. } => "AgentScored",
            LedgerEvent::RoundCompleted { .. } => "RoundCompleted",
            LedgerEvent::AgentPruned { .. } => "AgentPruned",
            LedgerEvent::GenerationAdvanced { .. } => "GenerationAdvanced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let event = LedgerEvent::RoundStarted {
            round_number: 3,
            generation: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["data"]["round_number"], 3);
    }
}
