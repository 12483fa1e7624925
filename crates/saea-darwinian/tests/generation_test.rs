//! Integration Tests for the Darwinian generation loop
//!
//! Runs the Run Controller and Generation Orchestrator against the in-memory
//! ledger:
//! - End-to-end evolution with elitism
//! - Bootstrap idempotence across runs
//! - Per-agent partial failures (skipped and counted)
//! - Fatal round and generation failures

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use saea_common::{content_hash, Identity, LedgerError};
use saea_darwinian::{
    EvolutionConfig, EvolutionError, GenerationError, GenerationOrchestrator, GenerationPhase,
    RunController, SetupError,
};
use saea_ledger::{agent_address, Fault, InMemoryLedger, LedgerClient, LedgerEvent};

fn authority() -> Identity {
    Identity::from_seed(b"saea-test-authority")
}

fn ledger() -> Arc<InMemoryLedger> {
    Arc::new(InMemoryLedger::new(authority()))
}

/// Population 4, genome 16, one round, elitism 1, threshold 100
fn small_config() -> EvolutionConfig {
    EvolutionConfig {
        population_size: 4,
        genome_length: 16,
        generations_to_run: 1,
        rounds_per_generation: 1,
        min_fitness_threshold: 100,
        elitism_count: 1,
        ..Default::default()
    }
}

fn controller(
    ledger: &Arc<InMemoryLedger>,
    config: EvolutionConfig,
    seed: u64,
) -> RunController<InMemoryLedger, StdRng> {
    RunController::new(Arc::clone(ledger), config, StdRng::seed_from_u64(seed)).unwrap()
}

#[cfg(test)]
mod end_to_end_tests {
    use super::*;

    /// Test: only the elite keeps its registered genome
    #[tokio::test]
    async fn test_single_elite_keeps_genome() {
        let ledger = ledger();
        let report = controller(&ledger, small_config(), 7).run().await.unwrap();

        assert_eq!(report.generations.len(), 1);
        let generation = &report.generations[0];
        assert_eq!(generation.rounds_run, 1);
        assert_eq!(generation.active_agents, 4);
        assert_eq!(generation.agents_pruned, 0);
        assert_eq!(generation.agents_mutated, 3);

        let registered: Vec<_> = ledger
            .events()
            .into_iter()
            .filter_map(|event| match event {
                LedgerEvent::AgentRegistered {
                    agent, genome_hash, ..
                } => Some((agent, genome_hash)),
                _ => None,
            })
            .collect();
        assert_eq!(registered.len(), 4);

        let agents = ledger.get_all_agents().await.unwrap();
        let unchanged: Vec<_> = agents
            .iter()
            .filter(|agent| {
                registered
                    .iter()
                    .any(|(handle, hash)| *handle == agent.handle && *hash == content_hash(&agent.genome))
                    && agent.mutation_count == 0
            })
            .collect();
        assert_eq!(unchanged.len(), 1);
        assert_eq!(
            generation.best_genome_hash,
            Some(content_hash(&unchanged[0].genome))
        );

        for agent in agents.iter().filter(|a| a.handle != unchanged[0].handle) {
            assert_eq!(agent.mutation_count, 1);
            assert_eq!(agent.parent, unchanged[0].handle);
        }
    }

    /// Test: the run report carries rounds, decisions and a ranked leaderboard
    #[tokio::test]
    async fn test_run_report_contents() {
        let ledger = ledger();
        let config = EvolutionConfig {
            generations_to_run: 3,
            rounds_per_generation: 2,
            ..small_config()
        };
        let report = controller(&ledger, config, 11).run().await.unwrap();

        assert_eq!(report.generations.len(), 3);
        assert!(report.finished_at.is_some());

        let rounds: Vec<u64> = report
            .generations
            .iter()
            .flat_map(|g| g.rounds.iter().map(|r| r.round_number))
            .collect();
        assert_eq!(rounds, vec![1, 2, 3, 4, 5, 6]);

        for generation in &report.generations {
            assert!(generation.adaptation.is_some());
            assert!(generation
                .decisions
                .iter()
                .any(|d| d.starts_with("Mutation rate")));
            assert!((1000..=8000).contains(&generation.mutation_rate_bps));
        }

        let arena = ledger.get_arena().await.unwrap().unwrap();
        assert_eq!(arena.current_generation, 4);
        assert_eq!(arena.current_round, 6);

        let fitness: Vec<u64> = report.leaderboard.iter().map(|e| e.fitness).collect();
        assert!(fitness.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(report.leaderboard[0].rank, 1);
        assert_eq!(report.leaderboard.len() as u64, arena.active_agents);
    }

    /// Test: the same seed registers the same genomes
    #[tokio::test]
    async fn test_seeded_runs_register_same_genomes() {
        async fn registered_hashes(seed: u64) -> Vec<String> {
            let ledger = ledger();
            controller(&ledger, small_config(), seed).run().await.unwrap();
            ledger
                .events()
                .into_iter()
                .filter_map(|event| match event {
                    LedgerEvent::AgentRegistered { genome_hash, .. } => Some(genome_hash.to_hex()),
                    _ => None,
                })
                .collect()
        }

        assert_eq!(registered_hashes(42).await, registered_hashes(42).await);
        assert_ne!(registered_hashes(42).await, registered_hashes(43).await);
    }
}

#[cfg(test)]
mod bootstrap_tests {
    use super::*;

    /// Test: a second run reuses the arena and appends new agents
    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let ledger = ledger();
        controller(&ledger, small_config(), 1).run().await.unwrap();

        let mut second = controller(&ledger, small_config(), 2);
        let report = second.run().await.unwrap();

        let initializations = ledger
            .events()
            .iter()
            .filter(|e| matches!(e, LedgerEvent::ArenaInitialized { .. }))
            .count();
        assert_eq!(initializations, 1);

        let arena = ledger.get_arena().await.unwrap().unwrap();
        assert_eq!(arena.total_agents, 8);
        assert_eq!(arena.current_generation, 3);

        let expected: Vec<_> = (4..8).map(|i| agent_address(&authority(), i)).collect();
        assert_eq!(second.orchestrator().tracked(), expected.as_slice());

        // Rounds continue after the first run's
        assert_eq!(report.generations[0].rounds[0].round_number, 2);
    }

    /// Test: a reused arena's fitness threshold governs pruning over the configured one
    #[tokio::test]
    async fn test_reused_arena_threshold_governs_pruning() {
        let ledger = ledger();
        ledger.initialize_arena(64, u64::MAX, 3000).await.unwrap();

        let report = controller(&ledger, small_config(), 6).run().await.unwrap();
        let generation = &report.generations[0];
        assert_eq!(generation.pruning.attempted, 4);
        assert_eq!(generation.pruning.applied, 4);
        assert_eq!(generation.pruning.skipped, 0);
        assert_eq!(generation.agents_mutated, 0);

        let arena = ledger.get_arena().await.unwrap().unwrap();
        assert_eq!(arena.min_fitness_threshold, u64::MAX);
        assert_eq!(arena.active_agents, 0);
    }

    /// Test: funding failure is not fatal
    #[tokio::test]
    async fn test_funding_failure_is_tolerated() {
        let ledger = ledger();
        ledger.inject_fault(Fault::Funding);

        let report = controller(&ledger, small_config(), 3).run().await.unwrap();
        assert_eq!(report.generations.len(), 1);
        assert_eq!(ledger.balance(&authority()), 0);
        assert_eq!(ledger.pending_faults(), 0);
    }

    /// Test: funding is credited when the request succeeds
    #[tokio::test]
    async fn test_funding_credited() {
        let ledger = ledger();
        let run = controller(&ledger, small_config(), 3);
        run.bootstrap().await.unwrap();
        assert_eq!(ledger.balance(&authority()), 20);
    }

    /// Test: registration failure is a setup failure
    #[tokio::test]
    async fn test_registration_failure_is_setup_error() {
        let ledger = ledger();
        ledger.inject_fault(Fault::Register);

        let err = controller(&ledger, small_config(), 4).run().await.unwrap_err();
        assert!(err.is_setup());
        assert!(matches!(
            err,
            EvolutionError::Setup(SetupError::Register { index: 0, .. })
        ));
    }

    /// Test: seeding past the arena capacity is a setup failure
    #[tokio::test]
    async fn test_capacity_exhausted_is_setup_error() {
        let ledger = ledger();
        let config = EvolutionConfig {
            max_agents: 3,
            ..small_config()
        };
        let err = controller(&ledger, config, 5).run().await.unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Setup(SetupError::Register {
                index: 3,
                source: LedgerError::MaxAgentsReached { max: 3 },
            })
        ));
    }

    /// Test: invalid configuration is rejected before any ledger call
    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = EvolutionConfig {
            tournament_size: 0,
            ..small_config()
        };
        let result = RunController::new(ledger(), config, StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(EvolutionError::InvalidConfig(_))));
    }
}

#[cfg(test)]
mod partial_failure_tests {
    use super::*;

    /// Test: a failed score is skipped and counted
    #[tokio::test]
    async fn test_score_failure_skipped() {
        let ledger = ledger();
        ledger.inject_fault(Fault::Score(agent_address(&authority(), 0)));

        let report = controller(&ledger, small_config(), 8).run().await.unwrap();
        let scoring = report.generations[0].scoring;
        assert_eq!(scoring.attempted, 4);
        assert_eq!(scoring.applied, 3);
        assert_eq!(scoring.skipped, 1);
        assert_eq!(report.generations[0].rounds[0].participants, 3);
    }

    /// Test: a failed prune is skipped and the agent stays active
    #[tokio::test]
    async fn test_prune_failure_skipped() {
        let ledger = ledger();
        let victim = agent_address(&authority(), 0);
        ledger.inject_fault(Fault::Prune(victim));

        let config = EvolutionConfig {
            min_fitness_threshold: u64::MAX,
            ..small_config()
        };
        let report = controller(&ledger, config, 9).run().await.unwrap();
        let pruning = report.generations[0].pruning;
        assert_eq!(pruning.attempted, 4);
        assert_eq!(pruning.applied, 3);
        assert_eq!(pruning.skipped, 1);
        assert_eq!(report.generations[0].agents_pruned, 3);

        let agent = ledger.get_agent(victim).await.unwrap().unwrap();
        assert!(agent.is_active);
        assert_eq!(report.leaderboard.len(), 1);
    }

    /// Test: a failed genome replacement is skipped and counted
    #[tokio::test]
    async fn test_submit_failure_skipped() {
        let ledger = ledger();
        let victim = agent_address(&authority(), 0);
        ledger.inject_fault(Fault::Submit(victim));

        let config = EvolutionConfig {
            min_fitness_threshold: 0,
            elitism_count: 0,
            ..small_config()
        };
        let report = controller(&ledger, config, 10).run().await.unwrap();
        let replacement = report.generations[0].replacement;
        assert_eq!(replacement.attempted, 4);
        assert_eq!(replacement.applied, 3);
        assert_eq!(replacement.skipped, 1);
        assert_eq!(report.generations[0].agents_mutated, 3);

        let agent = ledger.get_agent(victim).await.unwrap().unwrap();
        assert_eq!(agent.mutation_count, 0);
    }

    /// Test: agents pruned this generation are not replaced, and a
    /// population with nobody left yields an unrecorded generation
    #[tokio::test]
    async fn test_all_pruned_then_degenerate_generation() {
        let ledger = ledger();
        let config = EvolutionConfig {
            generations_to_run: 2,
            min_fitness_threshold: u64::MAX,
            ..small_config()
        };
        let report = controller(&ledger, config, 12).run().await.unwrap();

        assert_eq!(report.generations.len(), 1);
        let generation = &report.generations[0];
        assert_eq!(generation.agents_pruned, 4);
        assert_eq!(generation.replacement.attempted, 0);
        assert!(report.leaderboard.is_empty());

        let arena = ledger.get_arena().await.unwrap().unwrap();
        assert_eq!(arena.active_agents, 0);
        // The second generation ran its round but did not advance
        assert_eq!(arena.current_round, 2);
        assert_eq!(arena.current_generation, 2);

        let round = ledger.get_round(2).await.unwrap().unwrap();
        assert!(round.is_complete);
        assert_eq!(round.participants, 0);
    }
}

#[cfg(test)]
mod fatal_failure_tests {
    use super::*;

    /// Test: round start failure aborts the run mid-generation
    #[tokio::test]
    async fn test_round_start_failure_is_fatal() {
        let ledger = ledger();
        ledger.inject_fault(Fault::RunRound);

        let err = controller(&ledger, small_config(), 13).run().await.unwrap_err();
        assert!(!err.is_setup());
        assert!(matches!(
            err,
            EvolutionError::Generation {
                generation: 1,
                source: GenerationError::RoundStart { round: 1, .. },
            }
        ));
    }

    /// Test: round completion failure aborts the run mid-generation
    #[tokio::test]
    async fn test_round_complete_failure_is_fatal() {
        let ledger = ledger();
        ledger.inject_fault(Fault::CompleteRound);

        let err = controller(&ledger, small_config(), 14).run().await.unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Generation {
                source: GenerationError::RoundComplete { round: 1, .. },
                ..
            }
        ));
    }

    /// Test: generation advance failure aborts the run
    #[tokio::test]
    async fn test_advance_failure_is_fatal() {
        let ledger = ledger();
        ledger.inject_fault(Fault::AdvanceGeneration);

        let err = controller(&ledger, small_config(), 15).run().await.unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Generation {
                source: GenerationError::Advance(LedgerError::Transport(_)),
                ..
            }
        ));
        let arena = ledger.get_arena().await.unwrap().unwrap();
        assert_eq!(arena.current_generation, 1);
    }

    /// Test: running a generation without an arena fails
    #[tokio::test]
    async fn test_missing_arena_is_fatal() {
        let mut orchestrator =
            GenerationOrchestrator::new(ledger(), small_config(), StdRng::seed_from_u64(16));
        let err = orchestrator.run_generation().await.unwrap_err();
        assert!(matches!(err, GenerationError::ArenaNotFound));
        assert!(orchestrator.reports().is_empty());
    }

    /// Test: a non-authority signer cannot start rounds
    #[tokio::test]
    async fn test_foreign_signer_cannot_run_rounds() {
        let ledger = ledger();
        ledger.initialize_arena(64, 100, 3000).await.unwrap();
        let foreign = Arc::new(ledger.as_signer(Identity::from_seed(b"intruder")));

        let mut orchestrator =
            GenerationOrchestrator::new(foreign, small_config(), StdRng::seed_from_u64(17));
        let err = orchestrator.run_generation().await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::RoundStart {
                source: LedgerError::Unauthorized,
                ..
            }
        ));
        assert_eq!(orchestrator.phase(), GenerationPhase::RoundsPending);
    }
}
