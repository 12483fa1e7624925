//! Run Controller: bootstrap, seed, iterate generations, rank
//!
//! Bootstrap is idempotent against an existing arena. Re-running never
//! re-initialises the arena and registers new agents after the ones already
//! in it.

use std::sync::Arc;

use rand::Rng;
use tracing::{info, instrument, warn};

use saea_common::{Arena, AgentHandle, LedgerError};
use saea_ledger::LedgerClient;

use crate::error::{EvolutionError, Result, SetupError};
use crate::fitness::rank_by_fitness;
use crate::genome::random_genome;
use crate::orchestrator::GenerationOrchestrator;
use crate::report::{LeaderboardEntry, RunReport};
use crate::telemetry::EvolutionMetrics;
use crate::EvolutionConfig;

pub struct RunController<L, R> {
    ledger: Arc<L>,
    config: EvolutionConfig,
    orchestrator: GenerationOrchestrator<L, R>,
}

impl<L, R> RunController<L, R>
where
    L: LedgerClient,
    R: Rng,
{
    /// Build a controller; the configuration is validated up front
    pub fn new(ledger: Arc<L>, config: EvolutionConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let orchestrator = GenerationOrchestrator::new(Arc::clone(&ledger), config.clone(), rng);
        Ok(Self {
            ledger,
            config,
            orchestrator,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<EvolutionMetrics>) -> Self {
        self.orchestrator = self.orchestrator.with_metrics(metrics);
        self
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator<L, R> {
        &self.orchestrator
    }

    /// Make sure the arena exists, initialising it when absent
    pub async fn bootstrap(&self) -> std::result::Result<(), SetupError> {
        if let Err(err) = self.ledger.request_funding(self.config.funding_amount).await {
            warn!(amount = self.config.funding_amount, error = %err, "Funding request failed");
        }

        if let Some(arena) = self
            .ledger
            .get_arena()
            .await
            .map_err(SetupError::ArenaRead)?
        {
            info!(
                generation = arena.current_generation,
                round = arena.current_round,
                agents = arena.total_agents,
                "Reusing existing arena"
            );
            if arena.min_fitness_threshold != self.config.min_fitness_threshold {
                warn!(
                    configured = self.config.min_fitness_threshold,
                    arena = arena.min_fitness_threshold,
                    "Configured fitness threshold differs from the arena's; pruning follows the arena"
                );
            }
            return Ok(());
        }

        match self
            .ledger
            .initialize_arena(
                self.config.max_agents,
                self.config.min_fitness_threshold,
                self.config.mutation_rate_bps,
            )
            .await
        {
            Ok(tx) => {
                info!(tx = %tx, max_agents = self.config.max_agents, "Arena initialized");
                Ok(())
            }
            Err(LedgerError::ArenaAlreadyInitialized) => {
                info!("Arena initialized concurrently, reusing it");
                Ok(())
            }
            Err(err) => Err(SetupError::Initialize(err)),
        }
    }

    /// Register `population_size` random genomes after the arena's existing agents
    pub async fn seed_population(&mut self) -> std::result::Result<Vec<AgentHandle>, SetupError> {
        let arena: Arena = self
            .ledger
            .get_arena()
            .await
            .map_err(SetupError::ArenaRead)?
            .ok_or(SetupError::ArenaNotFound)?;

        let start_index = arena.total_agents;
        let mut handles = Vec::with_capacity(self.config.population_size as usize);
        for offset in 0..self.config.population_size {
            let index = start_index + offset;
            let genome = random_genome(self.config.genome_length, self.orchestrator.rng_mut());
            let (tx, handle) = self
                .ledger
                .register_agent(genome, index)
                .await
                .map_err(|source| SetupError::Register { index, source })?;
            info!(index, agent = %handle.short(8), tx = %tx, "Agent registered");
            self.orchestrator.track(handle);
            handles.push(handle);
        }
        Ok(handles)
    }

    /// Bootstrap, seed, run every configured generation and rank the survivors
    #[instrument(skip(self), fields(generations = self.config.generations_to_run))]
    pub async fn run(&mut self) -> Result<RunReport> {
        let mut report = RunReport::start();
        info!(run_id = %report.run_id, "Evolution run starting");

        self.bootstrap().await?;
        self.seed_population().await?;

        for generation in 1..=self.config.generations_to_run {
            let gen_report = self
                .orchestrator
                .run_generation()
                .await
                .map_err(|source| EvolutionError::Generation { generation, source })?;
            info!(
                "Generation {}: best={} avg={} worst={} pruned={} mutated={} rate={}bps",
                gen_report.generation,
                gen_report.best_fitness,
                gen_report.average_fitness,
                gen_report.worst_fitness,
                gen_report.agents_pruned,
                gen_report.agents_mutated,
                gen_report.mutation_rate_bps
            );
        }

        report.generations = self.orchestrator.reports().to_vec();
        report.leaderboard = self.leaderboard().await?;
        for entry in &report.leaderboard {
            info!(
                rank = entry.rank,
                agent = %entry.handle.short(8),
                fitness = entry.fitness,
                generation = entry.generation,
                mutations = entry.mutation_count,
                genome = %entry.genome_hash.short(16),
                "Leaderboard"
            );
        }
        report.finish();
        info!(
            run_id = %report.run_id,
            generations = report.generations.len(),
            best = report.best_fitness(),
            "Evolution run complete"
        );
        Ok(report)
    }

    /// Every active agent in the arena ranked by fitness
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let mut active: Vec<_> = self
            .ledger
            .get_all_agents()
            .await
            .map_err(EvolutionError::Leaderboard)?
            .into_iter()
            .filter(|agent| agent.is_active)
            .collect();
        rank_by_fitness(&mut active);
        Ok(active
            .iter()
            .enumerate()
            .map(|(i, agent)| LeaderboardEntry::from_ranked(i + 1, agent))
            .collect())
    }
}
