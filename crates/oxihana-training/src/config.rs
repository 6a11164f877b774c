//! Run configuration.
//!
//! [`EvolutionConfig`] gathers every knob of a run. All fields have defaults,
//! so a JSON document only needs to name what it changes:
//!
//! ```rust
//! use oxihana_training::config::EvolutionConfig;
//!
//! let config = EvolutionConfig::from_json_str(
//!     r#"{ "generations": 10, "mutation": { "jitter_rate": 0.2 } }"#,
//! )
//! .unwrap();
//! assert_eq!(config.generations, 10);
//! assert_eq!(config.initial_population_size, 50);
//! ```
//!
//! Invalid configurations, including seed strings that do not decode, are
//! rejected before the first generation starts.

use std::{num::NonZeroUsize, thread};

use serde::{Deserialize, Serialize};

use crate::{
    codec::DecodeGenomeError, crossover::CrossoverOperator, genome::Genome,
    mutation::MutationOperator, reproduction::ReproductionScheduler,
};

/// Hand-tuned genome that replenishment spawns from by default.
pub const DEFAULT_SEED: &str = concat!(
    "{R=PS;L=1-3;H=0-0;U=0.063310;W=0.06330971, 0.117145516, 0.15623689, 0.10644951, -0.24107927, 0.12780342, 0.4718204, 0.7247719}",
    ">{R=PPS;L=1-3;H=0-8;U=0.668297;W=0.6682967, 0.11869569, 0.100679815, 0.12953922, -0.2827804, 0.12144014, 0.48272705, 0.778931}",
    ">{R=TAP;L=1-3;H=0-8;U=0.159808;W=0.15980834, 0.12995258, 0.21847118, 0.11413119, -0.10630783, 0.05989501, 0.43849492, 0.5681055}",
    ">{R=PS;L=1-3;H=0-8;U=0.018239;W=0.018238984, 0.12550148, 0.08266041, 0.118032835, -0.28588778, 0.08660595, 0.487055, 0.79237664}",
    ">{R=TAP;L=3-3;H=5-4;U=0.039606;W=0.03960633, 0.10325708, 0.13658598, 0.13309912, -0.30415744, 0.12176984, 0.4976891, 0.757141}",
    ">{R=TAU;L=1-3;H=0-8;U=0.094780;W=0.094779514, 0.17015794, 0.10871784, 0.08933269, -0.24344909, 0.1750237, 0.33825153, 0.6318985}",
    ">{R=OD;L=0-3;H=0-8;U=0.024424;W=0.024423653, 0.15138336, 0.14075342, 0.09473344, -0.18523018, 0.14681208, 0.5336484, 0.7439554}",
    ">{R=TAU;L=0-3;H=0-8;U=0.803651;W=0.803651, 0.39848068, -0.06410061, -0.28458428, 0.060878616, 0.3048276, 0.35715824, 0.27665156}",
    ">{R=OD;L=3-3;H=2-8;U=0.000367;W=3.671875E-4, 0.099656254, 0.10459375, 0.097593755, -0.29634374, 0.09715626, 0.50240624, 0.7982188}",
    ">{R=TAD;L=3-1;H=8-0;U=0.815959;W=0.81595933, 0.055366226, -0.32371068, 0.7377975, 0.13841186, 0.35326564, -0.8821597, 0.73575056}",
    ">{R=OD;L=3-3;H=2-0;U=0.788791;W=0.78879106, 0.5902765, 0.1043749, -0.37653336, 0.68054354, 0.57003605, -0.36801544, -0.07650026}",
);

/// Invalid run configuration.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("invalid configuration: {_0}")]
    Json(serde_json::Error),
    #[display("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },
    #[display("maximum population size {maximum} is smaller than initial population size {initial}")]
    PopulationBounds { initial: usize, maximum: usize },
    #[display("{field} must lie in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },
    #[display("{field} must be a finite non-negative step, got {value}")]
    InvalidStep { field: &'static str, value: f32 },
    #[display("seed #{index} does not decode: {source}")]
    Seed {
        index: usize,
        source: DecodeGenomeError,
    },
    #[display("cannot start evaluation workers: {_0}")]
    ThreadPool(rayon::ThreadPoolBuildError),
}

/// Parameters of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Worker threads for fitness evaluation.
    pub thread_count: usize,
    /// Population floor, restored at the start of every generation.
    pub initial_population_size: usize,
    /// Population ceiling, enforced at the end of every generation.
    pub maximum_population_size: usize,
    /// Probability that replenishment respawns a seed instead of a random genome.
    pub seed_spawn_chance: f64,
    /// Share of evaluated genomes that selection removes.
    pub extinction_rate: f64,
    pub generations: usize,
    /// Seats per simulated game.
    pub players: usize,
    /// Simulated games per genome per generation.
    pub rounds_per_genome: usize,
    /// Encoded genomes that replenishment may spawn from.
    pub seeds: Vec<String>,
    pub mutation: MutationOperator,
    pub crossover: CrossoverOperator,
    pub reproduction: ReproductionScheduler,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            thread_count: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            initial_population_size: 50,
            maximum_population_size: 400,
            seed_spawn_chance: 0.8,
            extinction_rate: 0.05,
            generations: 200,
            players: 4,
            rounds_per_genome: 20,
            seeds: vec![DEFAULT_SEED.to_owned()],
            mutation: MutationOperator::default(),
            crossover: CrossoverOperator::default(),
            reproduction: ReproductionScheduler::default(),
        }
    }
}

impl EvolutionConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<Self>(s).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks bounds, probabilities and jitter steps, and that every seed decodes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("thread_count", self.thread_count),
            ("initial_population_size", self.initial_population_size),
            ("generations", self.generations),
            ("players", self.players),
            ("rounds_per_genome", self.rounds_per_genome),
        ];
        for (field, value) in counts {
            if value < 1 {
                return Err(ConfigError::TooSmall { field, min: 1, value });
            }
        }
        if self.maximum_population_size < self.initial_population_size {
            return Err(ConfigError::PopulationBounds {
                initial: self.initial_population_size,
                maximum: self.maximum_population_size,
            });
        }

        let probabilities = [
            ("seed_spawn_chance", self.seed_spawn_chance),
            ("extinction_rate", self.extinction_rate),
        ]
        .into_iter()
        .chain(self.mutation.probabilities())
        .chain(self.crossover.probabilities());
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { field, value });
            }
        }
        for (field, value) in self.mutation.steps() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidStep { field, value });
            }
        }

        self.seed_genomes()?;
        Ok(())
    }

    /// Decodes the seed strings into root genomes.
    pub fn seed_genomes(&self) -> Result<Vec<Genome>, ConfigError> {
        self.seeds
            .iter()
            .enumerate()
            .map(|(index, seed)| {
                seed.parse::<Genome>()
                    .map_err(|source| ConfigError::Seed { index, source })
            })
            .collect()
    }
}
