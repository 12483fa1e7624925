//! Mutation-rate controller module
pub mod adaptive;

pub use self::adaptive::{
    adapt_mutation_rate, Adaptation, MutationRateController, RateDirection,
    MAX_ADAPTIVE_RATE_BPS, MIN_ADAPTIVE_RATE_BPS,
};
