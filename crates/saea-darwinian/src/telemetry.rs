//! Prometheus metrics for evolution runs

use prometheus::{IntCounter, IntGauge, Registry};

/// Counters and gauges updated by the orchestrator
pub struct EvolutionMetrics {
    pub rounds_total: IntCounter,
    pub generations_total: IntCounter,
    pub scores_applied: IntCounter,
    pub scores_skipped: IntCounter,
    pub agents_pruned: IntCounter,
    pub prunes_skipped: IntCounter,
    pub genomes_replaced: IntCounter,
    pub replacements_skipped: IntCounter,
    pub mutation_rate_bps: IntGauge,
    pub best_fitness: IntGauge,
}

impl EvolutionMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            rounds_total: IntCounter::new("saea_rounds_total", "Rounds completed")?,
            generations_total: IntCounter::new(
                "saea_generations_total",
                "Generations advanced",
            )?,
            scores_applied: IntCounter::new("saea_scores_applied_total", "Agents scored")?,
            scores_skipped: IntCounter::new(
                "saea_scores_skipped_total",
                "Scoring calls skipped after a failure",
            )?,
            agents_pruned: IntCounter::new("saea_agents_pruned_total", "Agents pruned")?,
            prunes_skipped: IntCounter::new(
                "saea_prunes_skipped_total",
                "Prune calls skipped after a failure",
            )?,
            genomes_replaced: IntCounter::new(
                "saea_genomes_replaced_total",
                "Genome replacements committed",
            )?,
            replacements_skipped: IntCounter::new(
                "saea_replacements_skipped_total",
                "Genome replacements skipped after a failure",
            )?,
            mutation_rate_bps: IntGauge::new(
                "saea_mutation_rate_bps",
                "Controller mutation rate in basis points",
            )?,
            best_fitness: IntGauge::new(
                "saea_best_fitness",
                "Best fitness of the last aggregated generation",
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.rounds_total.clone()))?;
        registry.register(Box::new(self.generations_total.clone()))?;
        registry.register(Box::new(self.scores_applied.clone()))?;
        registry.register(Box::new(self.scores_skipped.clone()))?;
        registry.register(Box::new(self.agents_pruned.clone()))?;
        registry.register(Box::new(self.prunes_skipped.clone()))?;
        registry.register(Box::new(self.genomes_replaced.clone()))?;
        registry.register(Box::new(self.replacements_skipped.clone()))?;
        registry.register(Box::new(self.mutation_rate_bps.clone()))?;
        registry.register(Box::new(self.best_fitness.clone()))?;
        Ok(())
    }

    pub fn set_best_fitness(&self, fitness: u64) {
        self.best_fitness.set(i64::try_from(fitness).unwrap_or(i64::MAX));
    }
}
