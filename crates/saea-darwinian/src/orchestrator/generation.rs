//! Generation Orchestrator
//!
//! Drives one generation against the ledger:
//!
//! ```text
//! RoundsPending ─► Scoring ─► Aggregating ─► Selecting ─► Replacing ─► Advancing ─► Done
//!                     ▲   │        │
//!                     └───┘        └─(no active agents)──────────────────────────► Done
//!               (per round)
//! ```
//!
//! Every ledger call is awaited before the next decision. Snapshots read from
//! the ledger may be stale; a per-agent rejection is counted and skipped, while
//! round and generation transitions are fatal.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use saea_common::{content_hash, Agent, AgentHandle};
use saea_ledger::LedgerClient;

use crate::controller::MutationRateController;
use crate::culling::CullingPolicy;
use crate::error::GenerationError;
use crate::fitness::{rank_by_fitness, FitnessStats};
use crate::genome::{crossover, mutate, tournament_select};
use crate::report::{GenerationReport, RoundSummary};
use crate::telemetry::EvolutionMetrics;
use crate::EvolutionConfig;

use super::outcome::ItemOutcome;

/// Where the orchestrator is within the current generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    RoundsPending,
    Scoring,
    Aggregating,
    Selecting,
    Replacing,
    Advancing,
    Done,
}

pub struct GenerationOrchestrator<L, R> {
    ledger: Arc<L>,
    config: EvolutionConfig,
    rng: R,
    controller: MutationRateController,
    culling: CullingPolicy,
    /// Agents registered by this run, in registration order
    tracked: Vec<AgentHandle>,
    /// Reports of generations that advanced
    reports: Vec<GenerationReport>,
    phase: GenerationPhase,
    metrics: Option<Arc<EvolutionMetrics>>,
}

impl<L, R> GenerationOrchestrator<L, R>
where
    L: LedgerClient,
    R: Rng,
{
    pub fn new(ledger: Arc<L>, config: EvolutionConfig, rng: R) -> Self {
        let controller = MutationRateController::new(u32::from(config.mutation_rate_bps));
        let culling = CullingPolicy::new(config.min_fitness_threshold, config.elitism_count);
        Self {
            ledger,
            config,
            rng,
            controller,
            culling,
            tracked: Vec::new(),
            reports: Vec::new(),
            phase: GenerationPhase::Done,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EvolutionMetrics>) -> Self {
        metrics
            .mutation_rate_bps
            .set(i64::from(self.controller.rate_bps()));
        self.metrics = Some(metrics);
        self
    }

    pub fn track(&mut self, handle: AgentHandle) {
        self.tracked.push(handle);
    }

    pub fn tracked(&self) -> &[AgentHandle] {
        &self.tracked
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn mutation_rate_bps(&self) -> u32 {
        self.controller.rate_bps()
    }

    pub fn reports(&self) -> &[GenerationReport] {
        &self.reports
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    fn enter(&mut self, phase: GenerationPhase) {
        debug!(from = ?self.phase, to = ?phase, "Generation phase transition");
        self.phase = phase;
    }

    fn with_metrics_do(&self, f: impl FnOnce(&EvolutionMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }

    /// Run one full generation.
    ///
    /// Returns the generation report. When no tracked agent is active the
    /// report carries zero statistics and the generation is not advanced;
    /// such a report is not kept in [`reports`](Self::reports).
    #[instrument(skip(self), fields(generation = tracing::field::Empty))]
    pub async fn run_generation(&mut self) -> Result<GenerationReport, GenerationError> {
        self.enter(GenerationPhase::RoundsPending);

        let arena = self
            .ledger
            .get_arena()
            .await
            .map_err(GenerationError::ArenaRead)?
            .ok_or(GenerationError::ArenaNotFound)?;
        tracing::Span::current().record("generation", arena.current_generation);
        if arena.min_fitness_threshold != self.culling.threshold() {
            debug!(
                configured = self.culling.threshold(),
                arena = arena.min_fitness_threshold,
                "Pruning against the arena's fitness threshold"
            );
            self.culling = CullingPolicy::new(arena.min_fitness_threshold, self.config.elitism_count);
        }

        let mut report = GenerationReport::new(arena.current_generation, self.controller.rate_bps());

        for r in 0..self.config.rounds_per_generation {
            let round_number = arena.current_round + r + 1;
            self.run_round(round_number, &mut report).await?;
        }

        self.enter(GenerationPhase::Aggregating);
        let mut ranked = self.active_snapshot().await;
        if ranked.is_empty() {
            warn!("No active agents after scoring");
            report.decide("No active agents; skipping adaptation, selection and advancement");
            self.enter(GenerationPhase::Done);
            return Ok(report);
        }

        rank_by_fitness(&mut ranked);
        let stats = FitnessStats::from_agents(&ranked);
        report.apply_stats(&stats);
        report.best_genome_hash = Some(content_hash(&ranked[0].genome));
        self.with_metrics_do(|m| m.set_best_fitness(stats.best));

        let adaptation = self.controller.observe(stats.best);
        info!(
            before_bps = adaptation.before_bps,
            after_bps = adaptation.after_bps,
            direction = ?adaptation.direction(),
            "Mutation rate adapted"
        );
        report.decide(adaptation.describe());
        report.mutation_rate_bps = adaptation.after_bps;
        report.adaptation = Some(adaptation);
        self.with_metrics_do(|m| m.mutation_rate_bps.set(i64::from(self.controller.rate_bps())));

        self.enter(GenerationPhase::Selecting);
        let pruned = self.prune(&ranked, &mut report).await;

        self.enter(GenerationPhase::Replacing);
        self.replace(&ranked, &pruned, &mut report).await?;

        self.enter(GenerationPhase::Advancing);
        self.ledger
            .advance_generation()
            .await
            .map_err(GenerationError::Advance)?;
        self.with_metrics_do(|m| m.generations_total.inc());

        report.finalize();
        info!(
            best = report.best_fitness,
            average = report.average_fitness,
            worst = report.worst_fitness,
            pruned = report.agents_pruned,
            mutated = report.agents_mutated,
            skipped = report.total_skips(),
            mutation_rate_bps = report.mutation_rate_bps,
            "Generation complete"
        );
        self.reports.push(report.clone());
        self.enter(GenerationPhase::Done);
        Ok(report)
    }

    async fn run_round(
        &mut self,
        round_number: u64,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        self.ledger
            .run_round(round_number)
            .await
            .map_err(|source| GenerationError::RoundStart {
                round: round_number,
                source,
            })?;
        debug!(round = round_number, "Round started");

        self.enter(GenerationPhase::Scoring);
        for &handle in &self.tracked {
            let outcome: ItemOutcome = match self.ledger.get_agent(handle).await {
                Ok(Some(agent)) if agent.is_active => {
                    self.ledger.score_agent(handle, round_number).await.into()
                }
                Ok(_) => continue,
                Err(err) => ItemOutcome::skipped(err.to_string()),
            };
            if let Some(reason) = outcome.reason() {
                warn!(agent = %handle.short(8), round = round_number, reason, "Scoring skipped");
                self.with_metrics_do(|m| m.scores_skipped.inc());
            } else {
                self.with_metrics_do(|m| m.scores_applied.inc());
            }
            report.scoring.record(&outcome);
        }

        self.ledger
            .complete_round(round_number)
            .await
            .map_err(|source| GenerationError::RoundComplete {
                round: round_number,
                source,
            })?;
        report.rounds_run += 1;
        self.with_metrics_do(|m| m.rounds_total.inc());

        match self.ledger.get_round(round_number).await {
            Ok(Some(round)) => {
                let summary = RoundSummary::from(&round);
                debug!(
                    round = round_number,
                    participants = summary.participants,
                    best = summary.best_fitness,
                    "Round complete"
                );
                report.rounds.push(summary);
            }
            Ok(None) => warn!(round = round_number, "Completed round not readable"),
            Err(err) => warn!(round = round_number, error = %err, "Round read failed"),
        }
        Ok(())
    }

    /// Fresh read of every tracked agent, keeping the active ones in tracked order
    async fn active_snapshot(&self) -> Vec<Agent> {
        let mut active = Vec::with_capacity(self.tracked.len());
        for handle in &self.tracked {
            match self.ledger.get_agent(*handle).await {
                Ok(Some(agent)) if agent.is_active => active.push(agent),
                Ok(_) => {}
                Err(err) => warn!(agent = %handle.short(8), error = %err, "Agent read failed"),
            }
        }
        active
    }

    async fn prune(&self, ranked: &[Agent], report: &mut GenerationReport) -> HashSet<AgentHandle> {
        let (elites, _) = self.culling.split_elites(ranked);
        for elite in elites {
            report.decide(format!(
                "Elite {} kept (fitness {})",
                elite.handle.short(8),
                elite.fitness
            ));
        }

        let mut pruned = HashSet::new();
        let candidates: Vec<&Agent> = self.culling.prune_candidates(ranked).collect();
        for agent in candidates {
            let outcome: ItemOutcome = self.ledger.prune_agent(agent.handle).await.into();
            match outcome.reason() {
                None => {
                    report.decide(format!(
                        "Pruned {} (fitness {} < {})",
                        agent.handle.short(8),
                        agent.fitness,
                        self.culling.threshold()
                    ));
                    pruned.insert(agent.handle);
                    self.with_metrics_do(|m| m.agents_pruned.inc());
                }
                Some(reason) => {
                    warn!(agent = %agent.handle.short(8), reason, "Prune skipped");
                    self.with_metrics_do(|m| m.prunes_skipped.inc());
                }
            }
            report.pruning.record(&outcome);
        }
        pruned
    }

    async fn replace(
        &mut self,
        ranked: &[Agent],
        pruned: &HashSet<AgentHandle>,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        let (_, rest) = self.culling.split_elites(ranked);
        let lineage_parent = ranked[0].handle;
        let rate_bps = self.controller.rate_bps();

        for agent in rest.iter().filter(|a| !pruned.contains(&a.handle)) {
            let parent_a = tournament_select(ranked, self.config.tournament_size, &mut self.rng)?;
            let parent_b = tournament_select(ranked, self.config.tournament_size, &mut self.rng)?;
            let child = crossover(
                &parent_a.genome,
                &parent_b.genome,
                self.config.crossover_rate,
                &mut self.rng,
            );
            let child = mutate(&child, rate_bps, &mut self.rng);

            let outcome: ItemOutcome = self
                .ledger
                .submit_genome(agent.handle, child, lineage_parent)
                .await
                .into();
            match outcome.reason() {
                None => {
                    debug!(agent = %agent.handle.short(8), "Genome replaced");
                    self.with_metrics_do(|m| m.genomes_replaced.inc());
                }
                Some(reason) => {
                    warn!(agent = %agent.handle.short(8), reason, "Genome replacement skipped");
                    self.with_metrics_do(|m| m.replacements_skipped.inc());
                }
            }
            report.replacement.record(&outcome);
        }

        report.decide(format!(
            "Replaced {} of {} non-elite genomes at {} bps (lineage parent {})",
            report.replacement.applied,
            rest.len(),
            rate_bps,
            lineage_parent.short(8)
        ));
        Ok(())
    }
}
