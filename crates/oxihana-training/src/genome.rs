//! Genomes: ordered gene sequences with lineage metadata.
//!
//! A [`Genome`] is one candidate policy. Its genes are stored in a shared,
//! immutable slice, so cloning a genome is cheap and no operator can change a
//! genome after construction: mutation and crossover always build a new one
//! with a fresh [`GenomeId`].

use std::{
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use oxihana_policy::{
    game::GameView,
    rule::{BoxedDecisionRule, GuardedRule, RuleChain},
};
use rand::Rng;
use serde::Serialize;

use crate::{
    codec::{self, DecodeGenomeError},
    gene::Gene,
    simulation::RuleBuilder,
};

/// Genomes never grow past this many genes through insertion.
pub const MAX_GENES: usize = 20;

/// Number of genes of a spawned genome is `SPAWN_BASE_GENES + 1..=4`.
const SPAWN_BASE_GENES: usize = 5;

static NEXT_GENOME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GenomeId(u64);

impl GenomeId {
    fn next() -> Self {
        Self(NEXT_GENOME_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GenomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Where a genome came from.
///
/// Spawned and seeded genomes are roots. Crossover children record both
/// parents; mutants record the genome they were mutated from and keep that
/// genome's parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Lineage {
    parents: Option<[GenomeId; 2]>,
    mutation_of: Option<GenomeId>,
}

impl Lineage {
    #[must_use]
    pub const fn root() -> Self {
        Self {
            parents: None,
            mutation_of: None,
        }
    }

    #[must_use]
    pub const fn crossover(x: GenomeId, y: GenomeId) -> Self {
        Self {
            parents: Some([x, y]),
            mutation_of: None,
        }
    }

    /// Lineage of a mutant of `source`, whose own lineage is `self`.
    #[must_use]
    pub const fn mutation(self, source: GenomeId) -> Self {
        Self {
            parents: self.parents,
            mutation_of: Some(source),
        }
    }

    #[must_use]
    pub const fn parents(&self) -> Option<[GenomeId; 2]> {
        self.parents
    }

    #[must_use]
    pub const fn mutation_of(&self) -> Option<GenomeId> {
        self.mutation_of
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parents.is_none() && self.mutation_of.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("a genome needs at least one gene")]
pub struct EmptyGenomeError;

/// One candidate policy: an ordered, non-empty sequence of genes.
#[derive(Debug, Clone)]
pub struct Genome {
    id: GenomeId,
    lineage: Lineage,
    genes: Arc<[Gene]>,
}

impl Genome {
    /// Creates a root genome from a gene sequence.
    pub fn new(genes: Vec<Gene>) -> Result<Self, EmptyGenomeError> {
        if genes.is_empty() {
            return Err(EmptyGenomeError);
        }
        Ok(Self::derived(genes, Lineage::root()))
    }

    /// Builds a genome produced by an operator. Operators never produce an
    /// empty sequence.
    pub(crate) fn derived(genes: Vec<Gene>, lineage: Lineage) -> Self {
        debug_assert!(!genes.is_empty());
        Self {
            id: GenomeId::next(),
            lineage,
            genes: genes.into(),
        }
    }

    /// Spawns a root genome of 6 to 9 random genes.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let len = SPAWN_BASE_GENES + rng.random_range(1..=4);
        let genes = (0..len).map(|_| Gene::random(rng)).collect();
        Self::derived(genes, Lineage::root())
    }

    /// A new root genome carrying the same genes (used to spawn from seeds).
    #[must_use]
    pub fn respawn(&self) -> Self {
        Self {
            id: GenomeId::next(),
            lineage: Lineage::root(),
            genes: Arc::clone(&self.genes),
        }
    }

    #[must_use]
    pub fn id(&self) -> GenomeId {
        self.id
    }

    #[must_use]
    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Always `false`; present for API symmetry with [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Encodes the gene sequence; see [`codec`] for the format.
    #[must_use]
    pub fn encode(&self) -> String {
        codec::encode_genome(self.genes())
    }

    /// Compact description for logs, e.g. `PS[1-3|0-8](0.214) > OD[2-3|0-4](0.180)`.
    #[must_use]
    pub fn short(&self) -> ShortGenome<'_> {
        ShortGenome(self)
    }

    /// Builds the agent for `seat`: one guarded rule per gene, in genome order,
    /// closed by the builder's fallback rule.
    pub fn as_agent<V, B>(&self, seat: usize, builder: &B) -> RuleChain<V>
    where
        V: GameView,
        B: RuleBuilder<V> + ?Sized,
    {
        let rules = self
            .genes
            .iter()
            .map(|gene| {
                let rule = builder.build_rule(gene, seat);
                Box::new(GuardedRule::new(gene.lives(), gene.hints(), rule)) as BoxedDecisionRule<V>
            })
            .collect();
        RuleChain::new(rules, builder.build_fallback(seat))
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Genome {
    type Err = DecodeGenomeError;

    /// Decodes a root genome from its text encoding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let genes = codec::decode_genome(s)?;
        Ok(Self::derived(genes, Lineage::root()))
    }
}

/// Display adapter returned by [`Genome::short`].
#[derive(Debug, Clone, Copy)]
pub struct ShortGenome<'a>(&'a Genome);

impl fmt::Display for ShortGenome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gene) in self.0.genes().iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}
