//! Fitness-biased crossover of genes and genomes.
//!
//! # Gene crossover
//!
//! - **Same rule kind**: weights are averaged element-wise; the lives guard and
//!   the hints guard are each taken from a parent chosen by a fair coin.
//! - **Different rule kinds**: the fitter parent's gene is copied with
//!   probability `max(|fx - fy|, fitness_floor)`, or failing that with
//!   probability `fitter_rate`; otherwise either parent's gene is copied with
//!   equal odds.
//!
//! # Genome crossover
//!
//! Genes at shared positions are crossed pairwise. When the parents differ in
//! length, each trailing gene of the longer parent is kept with probability
//! `stronger_tail_rate` if the longer parent is the fitter one, and
//! `weaker_tail_rate` otherwise. The child records both parents.

use std::iter;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    gene::Gene,
    genome::{Genome, Lineage},
};

/// Crossover probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverOperator {
    /// Lower bound of the fitness-difference probability, so that equal
    /// fitness never rules out the fitter gene entirely.
    pub fitness_floor: f32,
    /// Flat probability of copying the fitter gene.
    pub fitter_rate: f64,
    /// Keep rate of trailing genes when the longer parent is the fitter one.
    pub stronger_tail_rate: f64,
    /// Keep rate of trailing genes when the longer parent is the weaker one.
    pub weaker_tail_rate: f64,
}

impl Default for CrossoverOperator {
    fn default() -> Self {
        Self {
            fitness_floor: 0.0001,
            fitter_rate: 0.4,
            stronger_tail_rate: 0.9,
            weaker_tail_rate: 0.4,
        }
    }
}

impl CrossoverOperator {
    /// All probabilities with their field names, for validation.
    #[must_use]
    pub fn probabilities(&self) -> [(&'static str, f64); 4] {
        [
            ("crossover.fitness_floor", f64::from(self.fitness_floor)),
            ("crossover.fitter_rate", self.fitter_rate),
            ("crossover.stronger_tail_rate", self.stronger_tail_rate),
            ("crossover.weaker_tail_rate", self.weaker_tail_rate),
        ]
    }

    /// Crosses two genes.
    pub fn cross_genes<R>(&self, x: &Gene, x_fitness: f32, y: &Gene, y_fitness: f32, rng: &mut R) -> Gene
    where
        R: Rng + ?Sized,
    {
        if x.kind() == y.kind() {
            let lives = if rng.random_bool(0.5) { x.lives() } else { y.lives() };
            let hints = if rng.random_bool(0.5) { x.hints() } else { y.hints() };
            let weights = x.weights().average(y.weights());
            return Gene::new(x.kind(), lives, hints, weights);
        }

        let fitter = if x_fitness > y_fitness { x } else { y };
        let difference = (x_fitness - y_fitness).abs().max(self.fitness_floor).min(1.0);
        if rng.random_bool(f64::from(difference)) || rng.random_bool(self.fitter_rate) {
            return *fitter;
        }
        if rng.random_bool(0.5) { *x } else { *y }
    }

    /// Crosses two genomes.
    pub fn cross_genomes<R>(
        &self,
        x: &Genome,
        x_fitness: f32,
        y: &Genome,
        y_fitness: f32,
        rng: &mut R,
    ) -> Genome
    where
        R: Rng + ?Sized,
    {
        let mut genes = iter::zip(x.genes(), y.genes())
            .map(|(a, b)| self.cross_genes(a, x_fitness, b, y_fitness, rng))
            .collect::<Vec<_>>();
        let shared = genes.len();

        if x.len() != y.len() {
            let x_is_stronger = x_fitness >= y_fitness;
            let (longer, longer_is_stronger) = if x.len() > y.len() {
                (x, x_is_stronger)
            } else {
                (y, !x_is_stronger)
            };
            let keep_rate = if longer_is_stronger {
                self.stronger_tail_rate
            } else {
                self.weaker_tail_rate
            };
            genes.extend(
                longer.genes()[shared..]
                    .iter()
                    .filter(|_| rng.random_bool(keep_rate))
                    .copied(),
            );
        }

        Genome::derived(genes, Lineage::crossover(x.id(), y.id()))
    }
}
