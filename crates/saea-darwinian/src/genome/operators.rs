//! Genetic operators: random genomes, mutation, crossover, tournament selection
//!
//! All operators are pure apart from the injected random source, so a seeded
//! `StdRng` reproduces every outcome exactly.

use rand::Rng;
use saea_common::{Agent, BPS_DENOMINATOR};

/// Largest absolute creep step
pub const CREEP_RANGE: i16 = 20;

/// Operator input errors
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OperatorError {
    #[error("Cannot select from an empty population")]
    EmptyPopulation,

    #[error("Tournament size must be at least 1")]
    InvalidTournamentSize,
}

/// Anything carrying a fitness score can take part in a tournament
pub trait Scored {
    fn fitness(&self) -> u64;
}

impl Scored for Agent {
    fn fitness(&self) -> u64 {
        self.fitness
    }
}

impl<T: Scored + ?Sized> Scored for &T {
    fn fitness(&self) -> u64 {
        (**self).fitness()
    }
}

/// The three per-gene mutation kinds, chosen uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Replace with a uniform random byte
    Reset,
    /// Add a uniform step in `[-20, 20]`, clamped to `[0, 255]`
    Creep,
    /// Flip one uniformly chosen bit
    BitFlip,
}

impl MutationKind {
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3u8) {
            0 => MutationKind::Reset,
            1 => MutationKind::Creep,
            _ => MutationKind::BitFlip,
        }
    }

    fn apply<R: Rng + ?Sized>(self, gene: u8, rng: &mut R) -> u8 {
        match self {
            MutationKind::Reset => rng.gen(),
            MutationKind::Creep => {
                let step = rng.gen_range(-CREEP_RANGE..=CREEP_RANGE);
                (gene as i16 + step).clamp(0, u8::MAX as i16) as u8
            }
            MutationKind::BitFlip => gene ^ (1u8 << rng.gen_range(0..8u32)),
        }
    }
}

/// Uniform random genome of `length` bytes
pub fn random_genome<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Vec<u8> {
    (0..length).map(|_| rng.gen()).collect()
}

/// Mutate each gene independently with probability `rate_bps / 10000`.
///
/// Returns a new genome; the input is left untouched.
pub fn mutate<R: Rng + ?Sized>(genome: &[u8], rate_bps: u32, rng: &mut R) -> Vec<u8> {
    genome
        .iter()
        .map(|&gene| {
            if rng.gen_range(0..BPS_DENOMINATOR) < rate_bps {
                MutationKind::sample(rng).apply(gene, rng)
            } else {
                gene
            }
        })
        .collect()
}

/// Two-point crossover with probability `rate`, otherwise a copy of
/// `parent_a`. The child has the shorter parent's length and takes
/// `parent_b` on the inclusive range `[start, end]`.
pub fn crossover<R: Rng + ?Sized>(parent_a: &[u8], parent_b: &[u8], rate: f64, rng: &mut R) -> Vec<u8> {
    let length = parent_a.len().min(parent_b.len());
    if length == 0 || rng.gen::<f64>() >= rate {
        return parent_a[..length].to_vec();
    }

    let p1 = rng.gen_range(0..length);
    let p2 = rng.gen_range(0..length);
    let (start, end) = (p1.min(p2), p1.max(p2));

    (0..length)
        .map(|i| {
            if (start..=end).contains(&i) {
                parent_b[i]
            } else {
                parent_a[i]
            }
        })
        .collect()
}

/// Tournament selection: `k` uniform draws with replacement, strictly
/// greater fitness wins, ties keep the first seen.
///
/// Draws are independent of the population size, so a small population can
/// still lose its best individual. For `k` well above the population size the
/// global maximum wins with overwhelming probability, never with certainty.
pub fn tournament_select<'a, T, R>(
    population: &'a [T],
    k: usize,
    rng: &mut R,
) -> Result<&'a T, OperatorError>
where
    T: Scored,
    R: Rng + ?Sized,
{
    if population.is_empty() {
        return Err(OperatorError::EmptyPopulation);
    }
    if k == 0 {
        return Err(OperatorError::InvalidTournamentSize);
    }

    let mut best: Option<&T> = None;
    let mut consider = |candidate: &'a T| {
        if best.map_or(true, |current| candidate.fitness() > current.fitness()) {
            best = Some(candidate);
        }
    };

    for _ in 0..k {
        consider(&population[rng.gen_range(0..population.len())]);
    }

    best.ok_or(OperatorError::EmptyPopulation)
}
