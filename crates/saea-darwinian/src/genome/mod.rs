//! Genome Operator Library
//!
//! Pure functions over byte genomes. Content hashing lives in
//! `saea_common::crypto` and is re-exported here with the operators.

pub mod operators;

pub use operators::{
    crossover, mutate, random_genome, tournament_select, MutationKind, OperatorError, Scored,
};
pub use saea_common::{content_hash, GenomeDigest};
