//! Mutation of genes and genomes.
//!
//! # Gene mutation
//!
//! At most one of three changes happens per call, checked in this order:
//!
//! 1. **Drastic** (`drastic_rate`): new random rule kind and guards; weights kept.
//! 2. **Guard reset** (`guard_reset_rate`): new random guards only.
//! 3. **Jitter** (`jitter_rate`): every weight moves by a fixed step with a
//!    random sign. The threshold moves by `threshold_step` (down one time in
//!    three, clamped to `[0, 1]`); preferences move by `preference_step`
//!    (fair sign, clamped to `[-1, 1]`).
//!
//! # Genome mutation
//!
//! The gene sequence is copied, then independently:
//!
//! - one random gene is deleted (`deletion_rate`, only if more than one gene),
//! - one random gene is appended (`insertion_rate`, only below [`MAX_GENES`]),
//! - two random genes swap places (`swap_rate`, only if more than three genes),
//!
//! and finally every gene goes through gene mutation. The mutant records the
//! original as `mutation_of` and keeps its parents.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    gene::{Gene, RuleKind, Weights, random_hints_range, random_lives_range},
    genome::{Genome, MAX_GENES},
};

/// Genomes with at most this many genes never get genes swapped.
const MIN_GENES_FOR_SWAP: usize = 4;

/// Mutation probabilities and step sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationOperator {
    /// Probability of replacing a gene's rule kind and guards.
    pub drastic_rate: f64,
    /// Probability of replacing a gene's guards.
    pub guard_reset_rate: f64,
    /// Probability of jittering every weight of a gene.
    pub jitter_rate: f64,
    /// Step applied to the threshold weight by a jitter.
    pub threshold_step: f32,
    /// Probability that a threshold jitter is downwards.
    pub threshold_decrease_rate: f64,
    /// Step applied to each preference weight by a jitter.
    pub preference_step: f32,
    /// Probability of deleting one gene from a genome.
    pub deletion_rate: f64,
    /// Probability of appending one random gene to a genome.
    pub insertion_rate: f64,
    /// Probability of swapping two genes of a genome.
    pub swap_rate: f64,
}

impl Default for MutationOperator {
    fn default() -> Self {
        Self {
            drastic_rate: 1.0 / 10_000.0,
            guard_reset_rate: 1.0 / 5_000.0,
            jitter_rate: 1.0 / 10.0,
            threshold_step: 0.0001,
            threshold_decrease_rate: 1.0 / 3.0,
            preference_step: 0.002,
            deletion_rate: 1.0 / 1_000.0,
            insertion_rate: 1.0 / 1_000.0,
            swap_rate: 1.0 / 50.0,
        }
    }
}

impl MutationOperator {
    /// All probabilities with their field names, for validation.
    #[must_use]
    pub fn probabilities(&self) -> [(&'static str, f64); 7] {
        [
            ("mutation.drastic_rate", self.drastic_rate),
            ("mutation.guard_reset_rate", self.guard_reset_rate),
            ("mutation.jitter_rate", self.jitter_rate),
            ("mutation.threshold_decrease_rate", self.threshold_decrease_rate),
            ("mutation.deletion_rate", self.deletion_rate),
            ("mutation.insertion_rate", self.insertion_rate),
            ("mutation.swap_rate", self.swap_rate),
        ]
    }

    /// Jitter step sizes with their field names, for validation.
    #[must_use]
    pub fn steps(&self) -> [(&'static str, f32); 2] {
        [
            ("mutation.threshold_step", self.threshold_step),
            ("mutation.preference_step", self.preference_step),
        ]
    }

    /// Returns a possibly mutated copy of `gene`.
    pub fn mutate_gene<R>(&self, gene: &Gene, rng: &mut R) -> Gene
    where
        R: Rng + ?Sized,
    {
        if rng.random_bool(self.drastic_rate) {
            return gene
                .with_kind(RuleKind::random(rng))
                .with_guards(random_lives_range(rng), random_hints_range(rng));
        }
        if rng.random_bool(self.guard_reset_rate) {
            return gene.with_guards(random_lives_range(rng), random_hints_range(rng));
        }
        if rng.random_bool(self.jitter_rate) {
            return gene.with_weights(self.jitter(gene.weights(), rng));
        }
        *gene
    }

    fn jitter<R>(&self, weights: &Weights, rng: &mut R) -> Weights
    where
        R: Rng + ?Sized,
    {
        let mut values = *weights.as_array();
        let (threshold, preferences) = values.split_at_mut(1);
        threshold[0] += if rng.random_bool(self.threshold_decrease_rate) {
            -self.threshold_step
        } else {
            self.threshold_step
        };
        for w in preferences {
            *w += if rng.random_bool(0.5) {
                -self.preference_step
            } else {
                self.preference_step
            };
        }
        Weights::clamped(values)
    }

    /// Returns a mutant of `genome`.
    pub fn mutate_genome<R>(&self, genome: &Genome, rng: &mut R) -> Genome
    where
        R: Rng + ?Sized,
    {
        let mut genes = genome.genes().to_vec();

        if genes.len() > 1 && rng.random_bool(self.deletion_rate) {
            let index = rng.random_range(0..genes.len());
            genes.remove(index);
        }
        if genes.len() < MAX_GENES && rng.random_bool(self.insertion_rate) {
            genes.push(Gene::random(rng));
        }
        if genes.len() >= MIN_GENES_FOR_SWAP && rng.random_bool(self.swap_rate) {
            let a = rng.random_range(0..genes.len());
            let b = rng.random_range(0..genes.len());
            genes.swap(a, b);
        }

        let genes = genes
            .iter()
            .map(|gene| self.mutate_gene(gene, rng))
            .collect();
        Genome::derived(genes, genome.lineage().mutation(genome.id()))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        gene::{WEIGHT_COUNT, tests::assert_weights_in_range},
        genome::tests::genome_of_len,
    };

    /// An operator where nothing ever happens.
    fn inert() -> MutationOperator {
        MutationOperator {
            drastic_rate: 0.0,
            guard_reset_rate: 0.0,
            jitter_rate: 0.0,
            deletion_rate: 0.0,
            insertion_rate: 0.0,
            swap_rate: 0.0,
            ..MutationOperator::default()
        }
    }

    mod gene_mutation {
        use super::*;

        #[test]
        fn test_inert_operator_keeps_gene() {
            let mut rng = Pcg32::seed_from_u64(1);
            let gene = Gene::random(&mut rng);
            assert_eq!(inert().mutate_gene(&gene, &mut rng), gene);
        }

        #[test]
        fn test_jitter_moves_every_weight_by_one_step() {
            let mut rng = Pcg32::seed_from_u64(2);
            let op = MutationOperator {
                jitter_rate: 1.0,
                ..inert()
            };
            let gene = Gene::new(
                RuleKind::TellAnyoneUseful,
                (1, 3).into(),
                (0, 8).into(),
                Weights::new([0.5; WEIGHT_COUNT]).unwrap(),
            );
            let mutant = op.mutate_gene(&gene, &mut rng);

            assert_eq!(mutant.kind(), gene.kind());
            assert_eq!(mutant.lives(), gene.lives());
            assert_eq!(mutant.hints(), gene.hints());
            let weights = mutant.weights().as_array();
            assert!(((weights[0] - 0.5).abs() - op.threshold_step).abs() < 1e-6);
            for w in &weights[1..] {
                assert!(((w - 0.5).abs() - op.preference_step).abs() < 1e-6);
            }
        }

        #[test]
        fn test_jitter_clamps_at_bounds() {
            let mut rng = Pcg32::seed_from_u64(3);
            let op = MutationOperator {
                jitter_rate: 1.0,
                threshold_step: 0.5,
                preference_step: 0.5,
                ..inert()
            };
            let mut gene = Gene::new(
                RuleKind::PlayProbablySafe,
                (1, 3).into(),
                (0, 8).into(),
                Weights::new([0.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]).unwrap(),
            );
            for _ in 0..100 {
                gene = op.mutate_gene(&gene, &mut rng);
                assert_weights_in_range(&gene);
            }
        }

        #[test]
        fn test_drastic_keeps_weights() {
            let mut rng = Pcg32::seed_from_u64(4);
            let op = MutationOperator {
                drastic_rate: 1.0,
                jitter_rate: 1.0,
                ..inert()
            };
            let gene = Gene::random(&mut rng);
            let mutant = op.mutate_gene(&gene, &mut rng);
            assert_eq!(mutant.weights(), gene.weights());
        }

        #[test]
        fn test_guard_reset_keeps_kind_and_weights() {
            let mut rng = Pcg32::seed_from_u64(5);
            let op = MutationOperator {
                guard_reset_rate: 1.0,
                jitter_rate: 1.0,
                ..inert()
            };
            for _ in 0..50 {
                let gene = Gene::random(&mut rng);
                let mutant = op.mutate_gene(&gene, &mut rng);
                assert_eq!(mutant.kind(), gene.kind());
                assert_eq!(mutant.weights(), gene.weights());
                assert!(crate::gene::LIVES_SAMPLE_RANGE.contains(&mutant.lives().lo()));
            }
        }

        #[test]
        fn test_default_operator_preserves_weight_invariant() {
            let mut rng = Pcg32::seed_from_u64(6);
            let op = MutationOperator {
                jitter_rate: 0.9,
                ..MutationOperator::default()
            };
            let mut genes = (0..50).map(|_| Gene::random(&mut rng)).collect::<Vec<_>>();
            for _ in 0..200 {
                for gene in &mut genes {
                    *gene = op.mutate_gene(gene, &mut rng);
                    assert_weights_in_range(gene);
                }
            }
        }
    }

    mod genome_mutation {
        use super::*;

        #[test]
        fn test_single_gene_is_never_deleted() {
            let mut rng = Pcg32::seed_from_u64(7);
            let op = MutationOperator {
                deletion_rate: 1.0,
                ..inert()
            };
            let genome = genome_of_len(&mut rng, 1);
            for _ in 0..100 {
                assert_eq!(op.mutate_genome(&genome, &mut rng).len(), 1);
            }
        }

        #[test]
        fn test_full_genome_never_grows() {
            let mut rng = Pcg32::seed_from_u64(8);
            let op = MutationOperator {
                insertion_rate: 1.0,
                ..inert()
            };
            let genome = genome_of_len(&mut rng, MAX_GENES);
            for _ in 0..100 {
                assert_eq!(op.mutate_genome(&genome, &mut rng).len(), MAX_GENES);
            }
            let below = genome_of_len(&mut rng, MAX_GENES - 1);
            assert_eq!(op.mutate_genome(&below, &mut rng).len(), MAX_GENES);
        }

        #[test]
        fn test_deletion_removes_one_gene() {
            let mut rng = Pcg32::seed_from_u64(9);
            let op = MutationOperator {
                deletion_rate: 1.0,
                ..inert()
            };
            let genome = genome_of_len(&mut rng, 5);
            let mutant = op.mutate_genome(&genome, &mut rng);
            assert_eq!(mutant.len(), 4);
            assert!(mutant.genes().iter().all(|g| genome.genes().contains(g)));
        }

        #[test]
        fn test_swap_keeps_multiset() {
            let mut rng = Pcg32::seed_from_u64(10);
            let op = MutationOperator {
                swap_rate: 1.0,
                ..inert()
            };
            let genome = genome_of_len(&mut rng, 6);
            let mutant = op.mutate_genome(&genome, &mut rng);
            assert_eq!(mutant.len(), 6);
            assert!(genome.genes().iter().all(|g| mutant.genes().contains(g)));
        }

        #[test]
        fn test_mutant_lineage() {
            let mut rng = Pcg32::seed_from_u64(11);
            let genome = genome_of_len(&mut rng, 3);
            let mutant = inert().mutate_genome(&genome, &mut rng);
            assert_ne!(mutant.id(), genome.id());
            assert_eq!(mutant.lineage().mutation_of(), Some(genome.id()));
            assert_eq!(mutant.lineage().parents(), None);
            assert_eq!(mutant.genes(), genome.genes());
        }
    }
}
