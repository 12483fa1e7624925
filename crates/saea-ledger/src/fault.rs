//! One-shot fault injection for the in-memory ledger
//!
//! A queued fault makes the next matching call fail with
//! [`LedgerError::Transport`] before any state is touched, the way a dropped
//! or rejected remote call would look to the client.

use saea_common::{AgentHandle, LedgerError};

/// A call that should fail once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Register,
    Score(AgentHandle),
    Prune(AgentHandle),
    Submit(AgentHandle),
    RunRound,
    CompleteRound,
    AdvanceGeneration,
    Funding,
}

impl Fault {
    pub(crate) fn into_error(self) -> LedgerError {
        LedgerError::Transport(format!("injected fault: {:?}", self))
    }
}

/// Pending faults, consumed on first match
#[derive(Debug, Default)]
pub(crate) struct FaultPlan {
    pending: Vec<Fault>,
}

impl FaultPlan {
    pub(crate) fn push(&mut self, fault: Fault) {
        self.pending.push(fault);
    }

    /// Remove and return the first pending fault equal to `call`
    pub(crate) fn take(&mut self, call: Fault) -> Option<Fault> {
        let pos = self.pending.iter().position(|f| *f == call)?;
        Some(self.pending.remove(pos))
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
