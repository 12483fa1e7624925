//! Generation orchestration
pub mod generation;
pub mod outcome;

pub use self::generation::{GenerationOrchestrator, GenerationPhase};
pub use self::outcome::{ItemOutcome, OutcomeTally};
