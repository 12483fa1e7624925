//! # Darwinian
//!
//! Generation-based evolutionary search over byte genomes whose canonical
//! state lives in the arena ledger.
//!
//! ## Generation Loop
//!
//! ```text
//! ┌───────────────┐   ┌─────────────────────────┐   ┌───────────────┐
//! │ RunController │──►│ GenerationOrchestrator  │──►│ LedgerClient  │
//! │ bootstrap     │   │ rounds, score, rank,    │   │ (transitions) │
//! │ seed          │   │ adapt, prune, replace,  │   └───────────────┘
//! │ leaderboard   │   │ advance                 │
//! └───────────────┘   └────────────┬────────────┘
//!                                  │
//!                     ┌────────────┴────────────┐
//!                     │ genome operators        │
//!                     │ mutation-rate control   │
//!                     │ culling policy          │
//!                     └─────────────────────────┘
//! ```
//!
//! ## Mutation-Rate Control
//!
//! ```text
//! stagnation:  rate' = min(8000, rate × 1.3)
//! improvement: rate' = max(1000, rate × 0.8)
//! ```
//!
//! ## Culling Policy
//!
//! The top `elitism_count` agents keep their genomes. Agents with fitness
//! strictly below the arena threshold are pruned.

pub mod controller;
pub mod culling;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod orchestrator;
pub mod report;
pub mod run;
pub mod telemetry;

use serde::{Deserialize, Serialize};

use saea_common::{MAX_GENOME_LEN, MAX_MUTATION_RATE_BPS, MIN_MAX_AGENTS};

pub use controller::{adapt_mutation_rate, Adaptation, MutationRateController};
pub use culling::CullingPolicy;
pub use error::{EvolutionError, GenerationError, Result, SetupError};
pub use fitness::{rank_by_fitness, FitnessStats};
pub use genome::{crossover, mutate, random_genome, tournament_select, OperatorError};
pub use orchestrator::{GenerationOrchestrator, GenerationPhase, ItemOutcome, OutcomeTally};
pub use report::{GenerationReport, LeaderboardEntry, RoundSummary, RunReport};
pub use run::RunController;
pub use telemetry::EvolutionMetrics;

/// Evolution run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Agents registered by each run
    pub population_size: u64,
    /// Genome length in bytes
    pub genome_length: usize,
    pub generations_to_run: u64,
    pub rounds_per_generation: u64,
    /// Starting mutation rate, also the arena's initial rate
    pub mutation_rate_bps: u16,
    /// Fitness strictly below this is pruned
    pub min_fitness_threshold: u64,
    /// Arena capacity, used only when initialising
    pub max_agents: u64,
    pub elitism_count: usize,
    pub tournament_size: usize,
    /// Probability of two-point crossover
    pub crossover_rate: f64,
    /// Best-effort funding requested before bootstrap
    pub funding_amount: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 8,
            genome_length: 16,
            generations_to_run: 5,
            rounds_per_generation: 2,
            mutation_rate_bps: 3000,
            min_fitness_threshold: 500,
            max_agents: 64,
            elitism_count: 2,
            tournament_size: 3,
            crossover_rate: 0.7,
            funding_amount: 20,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EvolutionError::InvalidConfig(msg));

        if self.population_size == 0 {
            return invalid("population_size must be at least 1".into());
        }
        if self.genome_length == 0 || self.genome_length > MAX_GENOME_LEN {
            return invalid(format!(
                "genome_length must be in 1..={}, got {}",
                MAX_GENOME_LEN, self.genome_length
            ));
        }
        if self.rounds_per_generation == 0 {
            return invalid("rounds_per_generation must be at least 1".into());
        }
        if self.mutation_rate_bps > MAX_MUTATION_RATE_BPS {
            return invalid(format!(
                "mutation_rate_bps must be at most {}, got {}",
                MAX_MUTATION_RATE_BPS, self.mutation_rate_bps
            ));
        }
        if self.max_agents < MIN_MAX_AGENTS {
            return invalid(format!(
                "max_agents must be at least {}, got {}",
                MIN_MAX_AGENTS, self.max_agents
            ));
        }
        if self.tournament_size == 0 {
            return invalid("tournament_size must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return invalid(format!(
                "crossover_rate must be in [0, 1], got {}",
                self.crossover_rate
            ));
        }
        Ok(())
    }
}
