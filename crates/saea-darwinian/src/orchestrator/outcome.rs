//! Per-item outcomes for partial-failure loops
//!
//! Scoring, pruning and replacement each visit many agents. Every visit ends
//! in an explicit [`ItemOutcome`]; the loop never aborts on a single agent,
//! and the tally of outcomes goes into the generation report.

use serde::{Deserialize, Serialize};

use saea_common::LedgerError;

/// Result of one per-agent call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Applied,
    Skipped { reason: String },
}

impl ItemOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        ItemOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ItemOutcome::Applied)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ItemOutcome::Applied => None,
            ItemOutcome::Skipped { reason } => Some(reason),
        }
    }
}

impl<T> From<Result<T, LedgerError>> for ItemOutcome {
    fn from(result: Result<T, LedgerError>) -> Self {
        match result {
            Ok(_) => ItemOutcome::Applied,
            Err(err) => ItemOutcome::skipped(err.to_string()),
        }
    }
}

/// Counters for one per-agent operation within a generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub attempted: u64,
    pub applied: u64,
    pub skipped: u64,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.attempted += 1;
        match outcome {
            ItemOutcome::Applied => self.applied += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Fold another tally into this one
    pub fn absorb(&mut self, other: &OutcomeTally) {
        self.attempted += other.attempted;
        self.applied += other.applied;
        self.skipped += other.skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ledger_result() {
        let ok: Result<u8, LedgerError> = Ok(1);
        assert!(ItemOutcome::from(ok).is_applied());

        let err: Result<u8, LedgerError> = Err(LedgerError::AlreadyParticipated);
        let outcome = ItemOutcome::from(err);
        assert_eq!(outcome.reason(), Some("Agent already participated in this round"));
    }

    #[test]
    fn test_tally_counts() {
        let mut tally = OutcomeTally::default();
        tally.record(&ItemOutcome::Applied);
        tally.record(&ItemOutcome::skipped("transport"));
        tally.record(&ItemOutcome::Applied);
        assert_eq!(tally, OutcomeTally { attempted: 3, applied: 2, skipped: 1 });

        let mut total = OutcomeTally::default();
        total.absorb(&tally);
        total.absorb(&tally);
        assert_eq!(total.attempted, 6);
    }
}
