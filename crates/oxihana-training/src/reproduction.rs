//! Alpha/beta mating of survivors.
//!
//! Survivors arrive ranked best first. The top `alpha_percent` of them
//! (rounded down) are alphas, the rest are betas. Each alpha in turn mates
//! with up to `matings_per_alpha` betas, taking the best remaining beta each
//! time. Betas left over once every alpha has mated are paired with each
//! other in rank order; an odd one out does not mate.
//!
//! Every mating produces one child: `mutate(crossover(alpha, beta))`, with
//! the parents' mean scores as crossover fitness.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    crossover::CrossoverOperator, fitness::FitnessRecord, genome::Genome,
    mutation::MutationOperator,
};

/// Mating scheme parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionScheduler {
    /// Share of survivors, in percent, that become alphas.
    pub alpha_percent: usize,
    /// Maximum number of betas each alpha mates with.
    pub matings_per_alpha: usize,
}

impl Default for ReproductionScheduler {
    fn default() -> Self {
        Self {
            alpha_percent: 20,
            matings_per_alpha: 3,
        }
    }
}

impl ReproductionScheduler {
    /// Number of alphas among `survivors` ranked genomes.
    #[must_use]
    pub fn alpha_count(&self, survivors: usize) -> usize {
        (survivors * self.alpha_percent.min(100)) / 100
    }

    /// Produces the children of one generation.
    ///
    /// `survivors` must be ranked best first.
    pub fn reproduce<R>(
        &self,
        survivors: &[FitnessRecord],
        crossover: &CrossoverOperator,
        mutation: &MutationOperator,
        rng: &mut R,
    ) -> Vec<Genome>
    where
        R: Rng + ?Sized,
    {
        debug_assert!(survivors.is_sorted_by(|a, b| a.mean() >= b.mean()));

        let (alphas, betas) = survivors.split_at(self.alpha_count(survivors.len()));
        let mut betas = betas.iter().collect::<VecDeque<_>>();
        let mut children = vec![];

        for alpha in alphas {
            for beta in betas.drain(..self.matings_per_alpha.min(betas.len())) {
                children.push(mate(alpha, beta, crossover, mutation, rng));
            }
        }
        while let (Some(x), Some(y)) = (betas.pop_front(), betas.pop_front()) {
            children.push(mate(x, y, crossover, mutation, rng));
        }

        children
    }
}

fn mate<R>(
    x: &FitnessRecord,
    y: &FitnessRecord,
    crossover: &CrossoverOperator,
    mutation: &MutationOperator,
    rng: &mut R,
) -> Genome
where
    R: Rng + ?Sized,
{
    let child = crossover.cross_genomes(x.genome(), x.mean(), y.genome(), y.mean(), rng);
    mutation.mutate_genome(&child, rng)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::genome::{GenomeId, tests::genome_of_len};

    fn survivors(rng: &mut Pcg32, count: usize) -> Vec<FitnessRecord> {
        (0..count)
            .map(|i| {
                let score = i32::try_from(100 - i).unwrap();
                FitnessRecord::new(genome_of_len(rng, 5), vec![score])
            })
            .collect()
    }

    fn parents(children: &[Genome]) -> Vec<[GenomeId; 2]> {
        children
            .iter()
            .map(|child| child.lineage().parents().unwrap())
            .collect()
    }

    fn reproduce(survivors: &[FitnessRecord], rng: &mut Pcg32) -> Vec<Genome> {
        ReproductionScheduler::default().reproduce(
            survivors,
            &CrossoverOperator::default(),
            &MutationOperator::default(),
            rng,
        )
    }

    #[test]
    fn test_alpha_count() {
        let scheduler = ReproductionScheduler::default();
        assert_eq!(scheduler.alpha_count(10), 2);
        assert_eq!(scheduler.alpha_count(47), 9);
        assert_eq!(scheduler.alpha_count(4), 0);
        assert_eq!(scheduler.alpha_count(0), 0);
    }

    #[test]
    fn test_ten_survivors_make_seven_children() {
        let mut rng = Pcg32::seed_from_u64(1);
        let survivors = survivors(&mut rng, 10);
        let id = |i: usize| survivors[i].genome().id();

        let children = reproduce(&survivors, &mut rng);

        assert_eq!(children.len(), 7);
        let expected = [
            [id(0), id(2)],
            [id(0), id(3)],
            [id(0), id(4)],
            [id(1), id(5)],
            [id(1), id(6)],
            [id(1), id(7)],
            [id(8), id(9)],
        ];
        assert_eq!(parents(&children), expected);
        for child in &children {
            assert!(child.lineage().mutation_of().is_some());
        }
    }

    #[test]
    fn test_alphas_run_out_of_betas() {
        let mut rng = Pcg32::seed_from_u64(2);
        let scheduler = ReproductionScheduler {
            alpha_percent: 50,
            matings_per_alpha: 3,
        };
        let survivors = survivors(&mut rng, 6);
        let children = scheduler.reproduce(
            &survivors,
            &CrossoverOperator::default(),
            &MutationOperator::default(),
            &mut rng,
        );
        // alphas 0..3 and betas 3..6: the first alpha takes every beta
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn test_odd_leftover_beta_does_not_mate() {
        let mut rng = Pcg32::seed_from_u64(3);
        // no alphas, three betas: one pair
        let survivors = survivors(&mut rng, 3);
        assert_eq!(reproduce(&survivors, &mut rng).len(), 1);
    }

    #[test]
    fn test_too_few_survivors() {
        let mut rng = Pcg32::seed_from_u64(4);
        assert!(reproduce(&[], &mut rng).is_empty());
        let survivors = survivors(&mut rng, 1);
        assert!(reproduce(&survivors, &mut rng).is_empty());
    }
}
