//! Agent configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use saea_darwinian::EvolutionConfig;

/// Default path of the persisted run report
pub const DEFAULT_REPORT_PATH: &str = "saea-report.json";

/// Default seed the authority identity is derived from
pub const DEFAULT_AUTHORITY_SEED: &str = "saea-authority";

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Evolution parameters
    pub evolution: EvolutionConfig,
    /// Seed for the run's random source; entropy when absent
    pub rng_seed: Option<u64>,
    /// Seed of the signing identity
    pub authority_seed: String,
    /// Where the run report is written
    pub report_path: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionConfig::default(),
            rng_seed: None,
            authority_seed: DEFAULT_AUTHORITY_SEED.to_string(),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
        }
    }
}

impl AgentConfig {
    /// Load configuration from `.env` and `SAEA_*` environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        let evo = &mut cfg.evolution;

        parse_into(&lookup, "SAEA_POPULATION_SIZE", &mut evo.population_size)?;
        parse_into(&lookup, "SAEA_GENOME_LENGTH", &mut evo.genome_length)?;
        parse_into(&lookup, "SAEA_GENERATIONS", &mut evo.generations_to_run)?;
        parse_into(&lookup, "SAEA_ROUNDS_PER_GEN", &mut evo.rounds_per_generation)?;
        parse_into(&lookup, "SAEA_MUTATION_RATE_BPS", &mut evo.mutation_rate_bps)?;
        parse_into(&lookup, "SAEA_MIN_FITNESS_THRESHOLD", &mut evo.min_fitness_threshold)?;
        parse_into(&lookup, "SAEA_MAX_AGENTS", &mut evo.max_agents)?;
        parse_into(&lookup, "SAEA_ELITISM_COUNT", &mut evo.elitism_count)?;
        parse_into(&lookup, "SAEA_TOURNAMENT_SIZE", &mut evo.tournament_size)?;
        parse_into(&lookup, "SAEA_CROSSOVER_RATE", &mut evo.crossover_rate)?;
        parse_into(&lookup, "SAEA_FUNDING_AMOUNT", &mut evo.funding_amount)?;

        if let Some(val) = lookup("SAEA_RNG_SEED") {
            cfg.rng_seed = Some(
                val.parse()
                    .with_context(|| format!("Invalid SAEA_RNG_SEED: {}", val))?,
            );
        }
        if let Some(val) = lookup("SAEA_AUTHORITY_SEED") {
            cfg.authority_seed = val;
        }
        if let Some(val) = lookup("SAEA_REPORT_PATH") {
            cfg.report_path = PathBuf::from(val);
        }

        cfg.evolution.validate()?;
        Ok(cfg)
    }
}

fn parse_into<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) -> Result<()>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(val) = lookup(key) {
        *slot = val
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {}", key, val))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let cfg = AgentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.evolution, EvolutionConfig::default());
        assert_eq!(cfg.rng_seed, None);
        assert_eq!(cfg.report_path, PathBuf::from(DEFAULT_REPORT_PATH));
    }

    #[test]
    fn test_env_overrides() {
        let cfg = AgentConfig::from_lookup(lookup(&[
            ("SAEA_POPULATION_SIZE", "12"),
            ("SAEA_MUTATION_RATE_BPS", " 4500 "),
            ("SAEA_CROSSOVER_RATE", "0.5"),
            ("SAEA_RNG_SEED", "99"),
            ("SAEA_REPORT_PATH", "/tmp/out.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.evolution.population_size, 12);
        assert_eq!(cfg.evolution.mutation_rate_bps, 4500);
        assert_eq!(cfg.evolution.crossover_rate, 0.5);
        assert_eq!(cfg.rng_seed, Some(99));
        assert_eq!(cfg.report_path, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn test_unparsable_value_is_an_error() {
        let err = AgentConfig::from_lookup(lookup(&[("SAEA_GENOME_LENGTH", "long")])).unwrap_err();
        assert!(err.to_string().contains("SAEA_GENOME_LENGTH"));
    }

    #[test]
    fn test_invalid_evolution_config_rejected() {
        assert!(AgentConfig::from_lookup(lookup(&[("SAEA_GENOME_LENGTH", "64")])).is_err());
    }
}
