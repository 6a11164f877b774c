//! Population bounds and the generation loop.
//!
//! # Generation state machine
//!
//! ```text
//! Replenish → Evaluate → Select → Reproduce → MergeAndCull ─┬→ Replenish (next generation)
//!                                                           └→ Done (last generation)
//! ```
//!
//! - **Replenish** tops the population up to the floor with seed respawns or
//!   random genomes.
//! - **Evaluate** scores every genome on the worker pool. Genomes whose
//!   evaluation failed leave the population here.
//! - **Select** truncates the ranked records to the survivors.
//! - **Reproduce** mates the survivors and reports the generation.
//! - **MergeAndCull** joins survivors and children and, above the ceiling,
//!   removes randomly chosen genomes.
//!
//! The population is within `[initial_size, maximum_size]` after Replenish
//! and at most `maximum_size` after MergeAndCull. There is no convergence
//! test: the loop always runs the configured number of generations and
//! returns the final population.

use log::{debug, info, warn};
use oxihana_stats::summary::SummaryStats;
use rand::{
    Rng,
    seq::{IndexedRandom, index},
};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    config::{ConfigError, EvolutionConfig},
    fitness::{Evaluation, FitnessEvaluator, FitnessRecord},
    genome::Genome,
    report::{GenerationSummary, ReportSink},
    selection,
    simulation::{GameSimulator, RuleBuilder},
};

/// Share of the population culled on top of the excess over the ceiling.
const CULL_MARGIN: f64 = 0.05;

/// Keeps the population between its floor and ceiling.
#[derive(Debug, Clone)]
pub struct PopulationController {
    /// Population floor.
    pub initial_size: usize,
    /// Population ceiling.
    pub maximum_size: usize,
    /// Genomes that replenishment may respawn.
    pub seeds: Vec<Genome>,
    /// Probability of respawning a seed rather than spawning a random genome.
    pub seed_spawn_chance: f64,
}

impl PopulationController {
    /// Spawns one genome for replenishment.
    pub fn spawn<R>(&self, rng: &mut R) -> Genome
    where
        R: Rng + ?Sized,
    {
        match self.seeds.choose(rng) {
            Some(seed) if rng.random_bool(self.seed_spawn_chance) => seed.respawn(),
            _ => Genome::random(rng),
        }
    }

    /// Spawns genomes until `population` reaches the floor.
    pub fn replenish<R>(&self, population: &mut Vec<Genome>, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let missing = self.initial_size.saturating_sub(population.len());
        population.extend((0..missing).map(|_| self.spawn(rng)));
    }

    /// Number of genomes to remove from a population of `size`.
    ///
    /// Zero within the ceiling; otherwise the excess plus 5% of `size`.
    #[must_use]
    pub fn cull_count(&self, size: usize) -> usize {
        if size <= self.maximum_size {
            return 0;
        }
        let excess = size - self.maximum_size;
        #[expect(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let margin = (size as f64 * CULL_MARGIN).floor() as usize;
        (excess + margin).min(size)
    }

    /// Removes [`cull_count`](Self::cull_count) genomes chosen uniformly at
    /// random. Order of the remaining genomes is preserved.
    pub fn cull<R>(&self, population: Vec<Genome>, rng: &mut R) -> Vec<Genome>
    where
        R: Rng + ?Sized,
    {
        let count = self.cull_count(population.len());
        if count == 0 {
            return population;
        }
        let mut doomed = vec![false; population.len()];
        for i in index::sample(rng, population.len(), count) {
            doomed[i] = true;
        }
        debug!("culling {count} of {} genomes", population.len());
        population
            .into_iter()
            .zip(doomed)
            .filter_map(|(genome, doomed)| (!doomed).then_some(genome))
            .collect()
    }

    /// Joins survivors and children, then culls down to the ceiling.
    pub fn merge_and_cull<R>(
        &self,
        survivors: Vec<FitnessRecord>,
        children: Vec<Genome>,
        rng: &mut R,
    ) -> Vec<Genome>
    where
        R: Rng + ?Sized,
    {
        let population = survivors
            .into_iter()
            .map(|record| record.genome().clone())
            .chain(children)
            .collect();
        self.cull(population, rng)
    }
}

#[derive(Debug)]
enum Phase {
    Replenish(Vec<Genome>),
    Evaluate(Vec<Genome>),
    Select(Evaluation),
    Reproduce {
        evaluation: Evaluation,
        survivors: Vec<FitnessRecord>,
    },
    MergeAndCull {
        survivors: Vec<FitnessRecord>,
        children: Vec<Genome>,
    },
    Done(Vec<Genome>),
}

impl Phase {
    const fn name(&self) -> &'static str {
        match self {
            Self::Replenish(_) => "replenish",
            Self::Evaluate(_) => "evaluate",
            Self::Select(_) => "select",
            Self::Reproduce { .. } => "reproduce",
            Self::MergeAndCull { .. } => "merge-and-cull",
            Self::Done(_) => "done",
        }
    }
}

/// Drives a complete optimization run.
pub struct GenerationLoop<'a, S, B>
where
    S: GameSimulator,
    B: RuleBuilder<S::View> + ?Sized,
{
    config: EvolutionConfig,
    controller: PopulationController,
    evaluator: FitnessEvaluator<'a, S, B>,
    pool: ThreadPool,
}

impl<'a, S, B> GenerationLoop<'a, S, B>
where
    S: GameSimulator,
    B: RuleBuilder<S::View> + ?Sized,
{
    /// Validates `config`, decodes its seeds and starts the worker pool.
    pub fn new(config: EvolutionConfig, simulator: &'a S, builder: &'a B) -> Result<Self, ConfigError> {
        config.validate()?;
        let controller = PopulationController {
            initial_size: config.initial_population_size,
            maximum_size: config.maximum_population_size,
            seeds: config.seed_genomes()?,
            seed_spawn_chance: config.seed_spawn_chance,
        };
        let evaluator = FitnessEvaluator {
            simulator,
            builder,
            players: config.players,
            rounds: config.rounds_per_genome,
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.thread_count)
            .thread_name(|i| format!("oxihana-eval-{i}"))
            .build()
            .map_err(ConfigError::ThreadPool)?;
        Ok(Self {
            config,
            controller,
            evaluator,
            pool,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn controller(&self) -> &PopulationController {
        &self.controller
    }

    /// Runs every generation and returns the final population.
    pub fn run<R>(&self, rng: &mut R, sink: &mut dyn ReportSink) -> Vec<Genome>
    where
        R: Rng + ?Sized,
    {
        let generations = self.config.generations;
        let mut generation = 1;
        let mut baseline: Option<SummaryStats> = None;
        let mut phase = Phase::Replenish(vec![]);

        loop {
            debug!("generation {generation}: {}", phase.name());
            phase = match phase {
                Phase::Replenish(mut population) => {
                    self.controller.replenish(&mut population, rng);
                    Phase::Evaluate(population)
                }
                Phase::Evaluate(population) => {
                    let evaluation = self.evaluator.evaluate_population(&self.pool, &population);
                    if !evaluation.failures.is_empty() {
                        warn!(
                            "generation {generation}: dropping {} of {} genomes whose evaluation failed",
                            evaluation.failures.len(),
                            population.len()
                        );
                    }
                    Phase::Select(evaluation)
                }
                Phase::Select(evaluation) => {
                    let survivors =
                        selection::truncate(evaluation.records.clone(), self.config.extinction_rate);
                    Phase::Reproduce {
                        evaluation,
                        survivors,
                    }
                }
                Phase::Reproduce {
                    evaluation,
                    survivors,
                } => {
                    let children = self.config.reproduction.reproduce(
                        &survivors,
                        &self.config.crossover,
                        &self.config.mutation,
                        rng,
                    );
                    if generation == 1 {
                        baseline = SummaryStats::from_scores(
                            evaluation.records.iter().flat_map(FitnessRecord::scores),
                        );
                    }
                    let summary = GenerationSummary::new(
                        generation,
                        &evaluation,
                        &survivors,
                        &children,
                        baseline.as_ref(),
                    );
                    self.log_generation(generation, &summary, &survivors);
                    sink.report(&summary);
                    Phase::MergeAndCull {
                        survivors,
                        children,
                    }
                }
                Phase::MergeAndCull {
                    survivors,
                    children,
                } => {
                    let population = self.controller.merge_and_cull(survivors, children, rng);
                    if generation >= generations {
                        Phase::Done(population)
                    } else {
                        generation += 1;
                        Phase::Replenish(population)
                    }
                }
                Phase::Done(population) => {
                    info!(
                        "finished {generations} generations with {} genomes",
                        population.len()
                    );
                    return population;
                }
            };
        }
    }

    fn log_generation(&self, generation: usize, summary: &GenerationSummary, survivors: &[FitnessRecord]) {
        let total = self.config.generations;
        match (&summary.mean_scores, survivors.first()) {
            (Some(means), Some(best)) => {
                info!(
                    "generation {generation}/{total}: {} genomes, fitness mean {:.3} max {:.3}, {} survivors, {} children",
                    summary.population_size,
                    means.mean,
                    means.max,
                    survivors.len(),
                    summary.children.len(),
                );
                info!("generation {generation}/{total}: best {}", best.genome().short());
            }
            _ => warn!("generation {generation}/{total}: no survivors"),
        }
    }
}
