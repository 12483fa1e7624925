//! Ledger record mirrors for the arena

pub mod agent;
pub mod arena;
pub mod identity;
pub mod round;
