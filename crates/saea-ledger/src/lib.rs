//! # SAEA Ledger
//!
//! The arena ledger as seen by the orchestrator: a capability offering
//! account reads and individually-confirmed state transitions.
//!
//! ## Components
//!
//! - **Client**: the [`LedgerClient`] trait every backend implements
//! - **Memory**: [`InMemoryLedger`], enforcing the ledger's transition rules in process
//! - **Fitness**: the ledger's deterministic scoring function
//! - **Events**: journal of committed transitions
//! - **Fault**: one-shot fault injection for partial-failure testing
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Generation Orchestrator             │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ LedgerClient
//!          ┌─────────────────┴──────────────────┐
//!          │                                    │
//! ┌────────┴─────────┐              ┌───────────┴─────────┐
//! │  InMemoryLedger  │              │   remote transport  │
//! │ (rules + events) │              │  (out of workspace) │
//! └──────────────────┘              └─────────────────────┘
//! ```

pub mod client;
pub mod events;
pub mod fault;
pub mod fitness;
pub mod memory;

pub use client::{LedgerClient, LedgerResult, TransactionId};
pub use events::LedgerEvent;
pub use fault::Fault;
pub use fitness::{compute_fitness, round_seed};
pub use memory::{agent_address, arena_address, InMemoryLedger};
