//! Fitness ranking and generation statistics
pub mod stats;

pub use self::stats::{rank_by_fitness, FitnessStats};
