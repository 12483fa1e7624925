//! Generation and run reports
//!
//! Reports are the orchestrator's only output. The binary persists a
//! [`RunReport`] as JSON; field names are the contract with report consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use saea_common::{content_hash, Agent, GenomeDigest, Identity, Round};

use crate::controller::Adaptation;
use crate::fitness::FitnessStats;
use crate::orchestrator::outcome::OutcomeTally;

/// Results of one sealed round, read back after completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u64,
    pub participants: u64,
    pub best_fitness: u64,
    pub average_fitness: u64,
    pub worst_fitness: u64,
}

impl From<&Round> for RoundSummary {
    fn from(round: &Round) -> Self {
        Self {
            round_number: round.round_number,
            participants: round.participants,
            best_fitness: round.best_fitness,
            average_fitness: round.average_fitness,
            worst_fitness: round.worst_fitness,
        }
    }
}

/// Statistics and decisions of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u64,
    pub rounds_run: u64,
    pub rounds: Vec<RoundSummary>,
    pub best_fitness: u64,
    pub average_fitness: u64,
    pub worst_fitness: u64,
    pub best_genome_hash: Option<GenomeDigest>,
    pub active_agents: usize,
    pub agents_pruned: u64,
    pub agents_mutated: u64,
    /// Rate after adaptation (unchanged when the generation had no active agents)
    pub mutation_rate_bps: u32,
    pub adaptation: Option<Adaptation>,
    pub scoring: OutcomeTally,
    pub pruning: OutcomeTally,
    pub replacement: OutcomeTally,
    /// Ordered decision log
    pub decisions: Vec<String>,
}

impl GenerationReport {
    pub fn new(generation: u64, mutation_rate_bps: u32) -> Self {
        Self {
            generation,
            rounds_run: 0,
            rounds: Vec::new(),
            best_fitness: 0,
            average_fitness: 0,
            worst_fitness: 0,
            best_genome_hash: None,
            active_agents: 0,
            agents_pruned: 0,
            agents_mutated: 0,
            mutation_rate_bps,
            adaptation: None,
            scoring: OutcomeTally::default(),
            pruning: OutcomeTally::default(),
            replacement: OutcomeTally::default(),
            decisions: Vec::new(),
        }
    }

    pub fn decide(&mut self, decision: impl Into<String>) {
        self.decisions.push(decision.into());
    }

    pub fn apply_stats(&mut self, stats: &FitnessStats) {
        self.best_fitness = stats.best;
        self.worst_fitness = stats.worst;
        self.average_fitness = stats.average;
        self.active_agents = stats.count;
    }

    /// Copy the per-operation tallies into the summary counters
    pub fn finalize(&mut self) {
        self.agents_pruned = self.pruning.applied;
        self.agents_mutated = self.replacement.applied;
    }

    /// Per-agent calls skipped across scoring, pruning and replacement
    pub fn total_skips(&self) -> u64 {
        self.scoring.skipped + self.pruning.skipped + self.replacement.skipped
    }
}

/// One row of the final ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub handle: Identity,
    pub fitness: u64,
    pub generation: u64,
    pub mutation_count: u64,
    pub rounds_participated: u64,
    pub average_fitness: u64,
    pub genome_hash: GenomeDigest,
}

impl LeaderboardEntry {
    pub fn from_ranked(rank: usize, agent: &Agent) -> Self {
        Self {
            rank,
            handle: agent.handle,
            fitness: agent.fitness,
            generation: agent.generation,
            mutation_count: agent.mutation_count,
            rounds_participated: agent.rounds_participated,
            average_fitness: agent.average_fitness(),
            genome_hash: content_hash(&agent.genome),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub generations: Vec<GenerationReport>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            finished_at: None,
            generations: Vec::new(),
            leaderboard: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Best fitness seen across all generations
    pub fn best_fitness(&self) -> u64 {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_copies_tallies() {
        let mut report = GenerationReport::new(1, 3000);
        report.pruning.applied = 2;
        report.pruning.skipped = 1;
        report.replacement.applied = 4;
        report.scoring.skipped = 3;
        report.finalize();
        assert_eq!(report.agents_pruned, 2);
        assert_eq!(report.agents_mutated, 4);
        assert_eq!(report.total_skips(), 4);
    }

    #[test]
    fn test_run_report_serializes() {
        let mut run = RunReport::start();
        let mut gen = GenerationReport::new(1, 3000);
        gen.best_fitness = 42;
        run.generations.push(gen);
        run.finish();

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["generations"][0]["best_fitness"], 42);
        assert!(json["finished_at"].is_string());
        assert_eq!(run.best_fitness(), 42);
    }
}
