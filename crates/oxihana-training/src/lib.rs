//! Genetic optimizer for rule-based card-game policies.
//!
//! This crate evolves *genomes*: ordered sequences of conditional rules with
//! tunable weights. An agent built from a genome plays by trying its rules in
//! order; the fitness of a genome is the mean score of simulated games played
//! by agents built from it.
//!
//! # How a Run Works
//!
//! Each generation goes through five phases (see [`population`]):
//!
//! 1. **Replenish** - Top the population up to its floor, from seed genomes or at random
//! 2. **Evaluate** - Play `rounds_per_genome` games per genome on a worker pool
//! 3. **Select** - Keep the best `1 - extinction_rate` share of genomes
//! 4. **Reproduce** - Mate survivors (alpha/beta scheme) with crossover and mutation
//! 5. **Merge & Cull** - Join survivors and children, then cull above the ceiling
//!
//! # Architecture
//!
//! ```text
//! GenerationLoop (population)
//!     ↓ evaluates with
//! FitnessEvaluator (fitness) ──→ GameSimulator + RuleBuilder (simulation, external)
//!     ↓ ranks with
//! selection
//!     ↓ mates with
//! ReproductionScheduler (reproduction)
//!     ↓ using
//! CrossoverOperator (crossover) + MutationOperator (mutation)
//!     ↓ acting on
//! Genome (genome) = [Gene (gene)], text form in codec
//! ```
//!
//! # Key Components
//!
//! - [`gene`] - Rule kinds, weight vectors and guard ranges
//! - [`genome`] - Gene sequences, identity and lineage; building agents
//! - [`codec`] - Text encoding used for seeds and reports
//! - [`mutation`] / [`crossover`] - Genetic operators
//! - [`simulation`] - Traits the game side implements
//! - [`fitness`] - Parallel evaluation with per-genome failure isolation
//! - [`selection`] / [`reproduction`] - Truncation selection and mating
//! - [`population`] - Population bounds and the generation loop
//! - [`config`] - Run configuration (JSON via serde)
//! - [`report`] - Per-generation summaries and sinks
//!
//! # Example
//!
//! ```
//! use oxihana_policy::{
//!     game::GameView,
//!     rule::{BoxedDecisionRule, BoxedFallbackRule, DecisionRule, FallbackRule, RuleChain},
//! };
//! use oxihana_training::{
//!     config::EvolutionConfig,
//!     gene::{Gene, RuleKind},
//!     population::GenerationLoop,
//!     report::GenerationSummary,
//!     simulation::{GameSimulator, RuleBuilder, SimulationError},
//! };
//!
//! struct Table;
//!
//! impl GameView for Table {
//!     type Action = RuleKind;
//!     fn lives_remaining(&self) -> u8 {
//!         3
//!     }
//!     fn hints_remaining(&self) -> u8 {
//!         8
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Propose(RuleKind);
//!
//! impl DecisionRule<Table> for Propose {
//!     fn evaluate(&self, _view: &Table) -> Option<RuleKind> {
//!         Some(self.0)
//!     }
//! }
//!
//! impl FallbackRule<Table> for Propose {
//!     fn decide(&self, _view: &Table) -> RuleKind {
//!         self.0
//!     }
//! }
//!
//! struct Builder;
//!
//! impl RuleBuilder<Table> for Builder {
//!     fn build_rule(&self, gene: &Gene, _seat: usize) -> BoxedDecisionRule<Table> {
//!         Box::new(Propose(gene.kind()))
//!     }
//!     fn build_fallback(&self, _seat: usize) -> BoxedFallbackRule<Table> {
//!         Box::new(Propose(RuleKind::RandomDiscard))
//!     }
//! }
//!
//! /// Rewards agents that open by playing a safe card.
//! struct Simulator;
//!
//! impl GameSimulator for Simulator {
//!     type View = Table;
//!     fn simulate(&self, agents: Vec<RuleChain<Table>>) -> Result<i32, SimulationError> {
//!         let safe = agents
//!             .iter()
//!             .filter(|agent| agent.decide(&Table) == RuleKind::PlaySafe)
//!             .count();
//!         Ok(i32::try_from(safe).unwrap_or(i32::MAX) * 5)
//!     }
//! }
//!
//! let config = EvolutionConfig {
//!     initial_population_size: 10,
//!     maximum_population_size: 20,
//!     generations: 3,
//!     rounds_per_genome: 2,
//!     seeds: vec![],
//!     ..EvolutionConfig::default()
//! };
//! let evolution = GenerationLoop::new(config, &Simulator, &Builder).unwrap();
//!
//! let mut summaries: Vec<GenerationSummary> = vec![];
//! let population = evolution.run(&mut rand::rng(), &mut summaries);
//!
//! assert_eq!(summaries.len(), 3);
//! assert!(population.len() <= 20);
//! ```
//!
//! # Current Limitations
//!
//! - **Opaque games**: The optimizer only sees a final score per game, so it
//!   cannot credit individual rules for good or bad decisions
//! - **Noisy fitness**: A genome is re-evaluated from scratch every generation
//!   and its fitness is the mean of a few games; survivors can be lucky
//! - **No convergence test**: Runs always last the configured number of generations

pub mod codec;
pub mod config;
pub mod crossover;
pub mod fitness;
pub mod gene;
pub mod genome;
pub mod mutation;
pub mod population;
pub mod report;
pub mod reproduction;
pub mod selection;
pub mod simulation;
