//! Generation statistics: best = max, worst = min, average = floor(sum / n)

use serde::{Deserialize, Serialize};

use saea_common::Agent;

/// Stable sort by fitness descending; equal fitness keeps input order
pub fn rank_by_fitness(agents: &mut [Agent]) {
    agents.sort_by(|a, b| b.fitness.cmp(&a.fitness));
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessStats {
    pub best: u64,
    pub worst: u64,
    pub average: u64,
    pub count: usize,
}

impl FitnessStats {
    /// Statistics over a population; all zero when empty
    pub fn from_agents(agents: &[Agent]) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        let total: u128 = agents.iter().map(|a| a.fitness as u128).sum();
        Self {
            best: agents.iter().map(|a| a.fitness).max().unwrap_or(0),
            worst: agents.iter().map(|a| a.fitness).min().unwrap_or(0),
            average: (total / agents.len() as u128) as u64,
            count: agents.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saea_common::{GenomeDigest, Identity};

    fn agent(seed: u8, fitness: u64) -> Agent {
        Agent {
            handle: Identity::from_seed(&[seed]),
            owner: Identity::NULL,
            genome: vec![seed],
            fitness,
            generation: 1,
            parent: Identity::NULL,
            parent_genome_hash: GenomeDigest::ZERO,
            mutation_count: 0,
            rounds_participated: 0,
            total_fitness: 0,
            is_active: true,
            registered_at: 0,
            last_round: 0,
        }
    }

    #[test]
    fn test_stats_floor_average() {
        let agents = vec![agent(1, 10), agent(2, 3), agent(3, 4)];
        let stats = FitnessStats::from_agents(&agents);
        assert_eq!(stats.best, 10);
        assert_eq!(stats.worst, 3);
        assert_eq!(stats.average, 5);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(FitnessStats::from_agents(&[]), FitnessStats::default());
    }

    #[test]
    fn test_rank_is_stable() {
        let mut agents = vec![agent(1, 5), agent(2, 9), agent(3, 5), agent(4, 9)];
        rank_by_fitness(&mut agents);
        let order: Vec<u8> = agents.iter().map(|a| a.genome[0]).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }
}
