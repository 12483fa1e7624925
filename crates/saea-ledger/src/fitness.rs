//! Ledger fitness function
//!
//! Deterministic for a given (genome, round seed) pair, unpredictable before
//! the round starts. The score is the sum of five components:
//!
//! ```text
//! fitness = proximity + diversity + balance + pattern + sequence
//! ```
//!
//! - proximity: closeness of each gene to a seed-derived target byte
//! - diversity: genome variance / 10, capped at 500
//! - balance: up to 500 for a gene sum centred on 128 per gene
//! - pattern: 10 per set bit of `gene ^ seed[i % 32]`
//! - sequence: up to 30 per adjacent pair ordered as the seed dictates

use saea_common::Identity;

/// Cap on the diversity component
pub const MAX_DIVERSITY_BONUS: u64 = 500;

/// Maximum balance component
pub const MAX_BALANCE_BONUS: u64 = 500;

/// Cap on a single adjacent-pair sequence bonus
pub const MAX_SEQUENCE_GAP: u64 = 30;

fn seed_byte(seed: &[u8; 32], parts: &[&[u8]]) -> u8 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(seed);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().as_bytes()[0]
}

/// Round seed fixed when a round starts
pub fn round_seed(arena: &Identity, round_number: u64, generation: u64, timestamp: i64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(arena.as_bytes());
    hasher.update(&round_number.to_le_bytes());
    hasher.update(&generation.to_le_bytes());
    hasher.update(&timestamp.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Score a genome against a round seed
pub fn compute_fitness(genome: &[u8], seed: &[u8; 32]) -> u64 {
    let n = genome.len() as u64;
    if n == 0 {
        return 0;
    }

    let proximity: u64 = genome
        .iter()
        .enumerate()
        .map(|(i, &gene)| {
            let target = seed_byte(seed, &[&[i as u8]]);
            255 - gene.abs_diff(target) as u64
        })
        .sum();

    let total: u64 = genome.iter().map(|&g| g as u64).sum();
    let mean = total / n;
    let variance = genome
        .iter()
        .map(|&g| {
            let d = (g as u64).abs_diff(mean);
            d * d
        })
        .sum::<u64>()
        / n;
    let diversity = (variance / 10).min(MAX_DIVERSITY_BONUS);

    let midpoint = 128 * n;
    let balance = MAX_BALANCE_BONUS * (midpoint - total.abs_diff(midpoint).min(midpoint)) / midpoint;

    let pattern: u64 = genome
        .iter()
        .enumerate()
        .map(|(i, &gene)| (gene ^ seed[i % 32]).count_ones() as u64 * 10)
        .sum();

    let sequence: u64 = genome
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let should_ascend = seed_byte(seed, &[&[i as u8], &[0xFF]]) > 127;
            let is_ascending = pair[1] >= pair[0];
            (should_ascend == is_ascending).then(|| (pair[1].abs_diff(pair[0]) as u64).min(MAX_SEQUENCE_GAP))
        })
        .sum();

    proximity + diversity + balance + pattern + sequence
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_genome_scores_zero() {
        assert_eq!(compute_fitness(&[], &[0u8; 32]), 0);
    }

    #[test]
    fn test_deterministic_per_seed() {
        let seed = round_seed(&Identity::from_seed(b"arena"), 1, 1, 1_700_000_000);
        let genome: Vec<u8> = (0..16).map(|i| (i * 13) as u8).collect();
        assert_eq!(compute_fitness(&genome, &seed), compute_fitness(&genome, &seed));
    }

    #[test]
    fn test_balanced_genome_gets_full_balance() {
        // All genes at 128: no diversity, full balance, no sequence gaps
        let genome = vec![128u8; 8];
        let seed = [0u8; 32];
        let score = compute_fitness(&genome, &seed);
        // pattern: 128 ^ 0 has one bit set -> 10 per gene
        assert!(score >= MAX_BALANCE_BONUS + 80);
    }

    #[test]
    fn test_seed_changes_with_round() {
        let arena = Identity::from_seed(b"arena");
        assert_ne!(round_seed(&arena, 1, 1, 0), round_seed(&arena, 2, 1, 0));
    }
}
