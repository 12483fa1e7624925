//! Adaptive mutation-rate controller
//!
//! Proportional on the sign of improvement only:
//!
//! ```text
//! stagnation  (curr_best <= prev_best): rate' = min(8000, floor(rate × 1.3))
//! improvement (curr_best >  prev_best): rate' = max(1000, floor(rate × 0.8))
//! ```
//!
//! Inputs outside `[1000, 8000]` are clamped first, so the output always lies
//! in that band.

use serde::{Deserialize, Serialize};

/// Lower bound of the controller's rate (10%)
pub const MIN_ADAPTIVE_RATE_BPS: u32 = 1_000;

/// Upper bound of the controller's rate (80%)
pub const MAX_ADAPTIVE_RATE_BPS: u32 = 8_000;

/// Next mutation rate given the previous and current best fitness
pub fn adapt_mutation_rate(current_bps: u32, prev_best: u64, curr_best: u64) -> u32 {
    let rate = current_bps.clamp(MIN_ADAPTIVE_RATE_BPS, MAX_ADAPTIVE_RATE_BPS);
    if curr_best <= prev_best {
        (rate * 13 / 10).min(MAX_ADAPTIVE_RATE_BPS)
    } else {
        (rate * 8 / 10).max(MIN_ADAPTIVE_RATE_BPS)
    }
}

/// Direction the controller moved in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDirection {
    Increased,
    Decreased,
    Unchanged,
}

/// One controller step, kept for the decision log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adaptation {
    pub before_bps: u32,
    pub after_bps: u32,
    pub prev_best: u64,
    pub curr_best: u64,
}

impl Adaptation {
    pub fn direction(&self) -> RateDirection {
        match self.after_bps.cmp(&self.before_bps) {
            std::cmp::Ordering::Greater => RateDirection::Increased,
            std::cmp::Ordering::Less => RateDirection::Decreased,
            std::cmp::Ordering::Equal => RateDirection::Unchanged,
        }
    }

    pub fn stagnated(&self) -> bool {
        self.curr_best <= self.prev_best
    }

    /// Decision-log line with before/after values and the reason
    pub fn describe(&self) -> String {
        let reason = if self.stagnated() {
            "stagnation"
        } else {
            "improvement"
        };
        let verb = match self.direction() {
            RateDirection::Increased => "increased",
            RateDirection::Decreased => "decreased",
            RateDirection::Unchanged => "held",
        };
        format!(
            "Mutation rate {} from {} to {} bps on {} (prev best: {}, curr best: {})",
            verb, self.before_bps, self.after_bps, reason, self.prev_best, self.curr_best
        )
    }
}

/// Controller state carried across generations
#[derive(Debug, Clone)]
pub struct MutationRateController {
    rate_bps: u32,
    previous_best: u64,
}

impl MutationRateController {
    /// Start at `initial_bps` with a previous best of 0
    pub fn new(initial_bps: u32) -> Self {
        Self {
            rate_bps: initial_bps,
            previous_best: 0,
        }
    }

    /// Rate used for mutation in the current generation
    pub fn rate_bps(&self) -> u32 {
        self.rate_bps
    }

    pub fn previous_best(&self) -> u64 {
        self.previous_best
    }

    /// Feed this generation's best fitness and persist the new rate
    pub fn observe(&mut self, current_best: u64) -> Adaptation {
        let adaptation = Adaptation {
            before_bps: self.rate_bps,
            after_bps: adapt_mutation_rate(self.rate_bps, self.previous_best, current_best),
            prev_best: self.previous_best,
            curr_best: current_best,
        };
        self.rate_bps = adaptation.after_bps;
        self.previous_best = current_best;
        adaptation
    }
}
