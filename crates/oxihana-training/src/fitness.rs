//! Parallel fitness evaluation.
//!
//! The fitness of a genome is the mean score of `rounds` simulated games, each
//! played by `players` agents freshly built from that genome (one per seat).
//!
//! One genome is one unit of work. A population is evaluated by submitting
//! every unit to a shared [`rayon::ThreadPool`] and waiting for all of them,
//! which makes evaluation a hard barrier between the single-threaded phases
//! of the generation loop.
//!
//! A failing unit never takes the generation down. Simulator errors and
//! panics raised while building or running agents are caught at the unit
//! boundary, logged, and returned as [`EvaluationError`]s next to the
//! records that did succeed.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use log::{error, warn};
use oxihana_stats::summary::SummaryStats;
use rayon::{ThreadPool, prelude::*};

use crate::{
    genome::{Genome, GenomeId},
    simulation::{GameSimulator, RuleBuilder, SimulationError},
};

/// Scores of one genome in one generation.
#[derive(Debug, Clone)]
pub struct FitnessRecord {
    genome: Genome,
    scores: Vec<i32>,
    mean: f32,
}

impl FitnessRecord {
    #[must_use]
    pub fn new(genome: Genome, scores: Vec<i32>) -> Self {
        let total = scores.iter().copied().map(i64::from).sum::<i64>();
        #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let mean = (total as f64 / scores.len().max(1) as f64) as f32;
        Self { genome, scores, mean }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Per-round scores, in round order.
    #[must_use]
    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    /// Mean score. This is the fitness used by selection and crossover.
    #[must_use]
    pub fn mean(&self) -> f32 {
        self.mean
    }

    #[must_use]
    pub fn stats(&self) -> Option<SummaryStats> {
        SummaryStats::from_scores(&self.scores)
    }
}

/// Failure of one unit of work.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EvaluationError {
    #[display("simulation of genome {genome} failed in round {round}")]
    Simulation {
        genome: GenomeId,
        round: usize,
        source: SimulationError,
    },
    #[display("evaluation of genome {genome} panicked: {message}")]
    Panicked { genome: GenomeId, message: String },
}

impl EvaluationError {
    #[must_use]
    pub fn genome(&self) -> GenomeId {
        match self {
            Self::Simulation { genome, .. } | Self::Panicked { genome, .. } => *genome,
        }
    }
}

/// Outcome of evaluating a population.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Records of the units that completed, in population order.
    pub records: Vec<FitnessRecord>,
    pub failures: Vec<EvaluationError>,
}

/// Evaluates genomes by playing simulated games.
pub struct FitnessEvaluator<'a, S, B>
where
    S: GameSimulator,
    B: RuleBuilder<S::View> + ?Sized,
{
    pub simulator: &'a S,
    pub builder: &'a B,
    /// Seats per game.
    pub players: usize,
    /// Games per genome.
    pub rounds: usize,
}

impl<S, B> FitnessEvaluator<'_, S, B>
where
    S: GameSimulator,
    B: RuleBuilder<S::View> + ?Sized,
{
    /// Plays `rounds` games with agents built from `genome`.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulator fails in any round, or if building
    /// or running the agents panics.
    pub fn evaluate_genome(&self, genome: &Genome) -> Result<FitnessRecord, EvaluationError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.play_rounds(genome))) {
            Ok(scores) => Ok(FitnessRecord::new(genome.clone(), scores?)),
            Err(payload) => Err(EvaluationError::Panicked {
                genome: genome.id(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn play_rounds(&self, genome: &Genome) -> Result<Vec<i32>, EvaluationError> {
        (0..self.rounds)
            .map(|round| {
                let agents = (0..self.players)
                    .map(|seat| genome.as_agent::<S::View, B>(seat, self.builder))
                    .collect();
                let score = self
                    .simulator
                    .simulate(agents)
                    .map_err(|source| EvaluationError::Simulation {
                        genome: genome.id(),
                        round,
                        source,
                    })?;
                if score < 0 {
                    warn!(
                        "genome {} hit a rule violation in round {round} (score {score})",
                        genome.id()
                    );
                }
                Ok(score)
            })
            .collect()
    }

    /// Evaluates every genome on `pool` and waits for all of them.
    pub fn evaluate_population(&self, pool: &ThreadPool, population: &[Genome]) -> Evaluation {
        let results = pool.install(|| {
            population
                .par_iter()
                .map(|genome| self.evaluate_genome(genome))
                .collect::<Vec<_>>()
        });

        let mut evaluation = Evaluation::default();
        for result in results {
            match result {
                Ok(record) => evaluation.records.push(record),
                Err(err) => {
                    error!("{err}");
                    evaluation.failures.push(err);
                }
            }
        }
        evaluation
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
