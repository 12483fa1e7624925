//! Culling policy: top-N elites survive unchanged, fitness < threshold is pruned
//!
//! Both decisions are taken on the same post-scoring snapshot. An elite can
//! still be pruned if it falls below the threshold.

use saea_common::Agent;

pub struct CullingPolicy {
    threshold: u64,
    elitism_count: usize,
}

impl CullingPolicy {
    pub fn new(threshold: u64, elitism_count: usize) -> Self {
        Self {
            threshold,
            elitism_count,
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Strictly below the threshold; equality survives
    pub fn should_prune(&self, fitness: u64) -> bool {
        fitness < self.threshold
    }

    /// Split a fitness-ranked snapshot into (elites, rest)
    pub fn split_elites<'a>(&self, ranked: &'a [Agent]) -> (&'a [Agent], &'a [Agent]) {
        ranked.split_at(self.elitism_count.min(ranked.len()))
    }

    /// Agents of the snapshot that fall below the threshold
    pub fn prune_candidates<'a>(&self, ranked: &'a [Agent]) -> impl Iterator<Item = &'a Agent> + 'a {
        let threshold = self.threshold;
        ranked.iter().filter(move |a| a.fitness < threshold)
    }
}
