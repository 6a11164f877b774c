//! Genes: one conditional rule with its activation guards and weights.
//!
//! A [`Gene`] is the smallest heritable unit of a genome. It carries:
//!
//! - a [`RuleKind`] selecting which decision rule the gene expresses,
//! - a lives-remaining [`GuardRange`] and a hints-remaining [`GuardRange`]
//!   deciding when the rule is active,
//! - eight real-valued [`Weights`] tuning the rule.
//!
//! The weight layout is fixed: `weights[0]` is a confidence/utility threshold
//! in `[0, 1]`, and `weights[1..8]` are signed hint preferences in `[-1, 1]`.
//! [`HintWeighting`] names each slot for rule builders.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use oxihana_policy::guard::GuardRange;
use rand::Rng;
use serde::Serialize;

/// Number of weights carried by every gene.
pub const WEIGHT_COUNT: usize = 8;

/// Valid values of the threshold weight (`weights[0]`).
pub const THRESHOLD_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Valid values of the preference weights (`weights[1..]`).
pub const PREFERENCE_RANGE: RangeInclusive<f32> = -1.0..=1.0;

/// Interval random lives-remaining guards are drawn from.
pub const LIVES_SAMPLE_RANGE: RangeInclusive<u8> = 1..=3;

/// Interval random hints-remaining guards are drawn from.
pub const HINTS_SAMPLE_RANGE: RangeInclusive<u8> = 0..=8;

/// Odds that a freshly spawned preference weight is negative.
const SPAWN_NEGATIVE_WEIGHT_PROBABILITY: f64 = 0.25;

/// The closed set of decision rules a gene can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleKind {
    /// Play a card known to be playable.
    PlaySafe,
    /// Play a card whose playability estimate exceeds the threshold weight.
    PlayProbablySafe,
    /// Hint another player about a playable card.
    TellAnyonePlayable,
    /// Hint another player about a card that is still useful.
    TellAnyoneUseful,
    /// Hint another player about a card that can be discarded.
    TellAnyoneUseless,
    /// Discard a card known to be useless, else the oldest unhinted card.
    OsawaDiscard,
    /// Discard a random card.
    RandomDiscard,
}

impl RuleKind {
    pub const ALL: [Self; 7] = [
        Self::PlaySafe,
        Self::PlayProbablySafe,
        Self::TellAnyonePlayable,
        Self::TellAnyoneUseful,
        Self::TellAnyoneUseless,
        Self::OsawaDiscard,
        Self::RandomDiscard,
    ];

    /// Short tag used by the text encoding.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::PlaySafe => "PS",
            Self::PlayProbablySafe => "PPS",
            Self::TellAnyonePlayable => "TAP",
            Self::TellAnyoneUseful => "TAU",
            Self::TellAnyoneUseless => "TAD",
            Self::OsawaDiscard => "OD",
            Self::RandomDiscard => "RD",
        }
    }

    /// Picks a rule kind uniformly at random.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown rule kind '{tag}'")]
pub struct ParseRuleKindError {
    #[error(not(source))]
    tag: String,
}

impl FromStr for RuleKind {
    type Err = ParseRuleKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // older encodings spelled the two "tell anyone" tags with signs
        match s {
            "TA+" => return Ok(Self::TellAnyoneUseful),
            "TA-" => return Ok(Self::TellAnyoneUseless),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| ParseRuleKindError { tag: s.to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WeightsError {
    #[display("expected {} weights, got {actual}", WEIGHT_COUNT)]
    WrongLength { actual: usize },
    #[display("weight #{index} is {value}, outside [{min}, {max}]")]
    OutOfRange {
        index: usize,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Fixed-length weight vector of a gene.
///
/// Every value of this type satisfies the range invariant: the threshold
/// lies in [`THRESHOLD_RANGE`] and the preferences in [`PREFERENCE_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights([f32; WEIGHT_COUNT]);

impl Weights {
    /// Creates a weight vector, rejecting values outside the valid ranges.
    pub fn new(values: [f32; WEIGHT_COUNT]) -> Result<Self, WeightsError> {
        for (index, &value) in values.iter().enumerate() {
            let range = Self::range_of(index);
            if !range.contains(&value) {
                return Err(WeightsError::OutOfRange {
                    index,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(Self(values))
    }

    /// Creates a weight vector from a slice of exactly [`WEIGHT_COUNT`] values.
    ///
    /// Slices of any other length are rejected, never truncated or padded.
    pub fn from_slice(values: &[f32]) -> Result<Self, WeightsError> {
        let values = <[f32; WEIGHT_COUNT]>::try_from(values).map_err(|_| {
            WeightsError::WrongLength {
                actual: values.len(),
            }
        })?;
        Self::new(values)
    }

    /// Clamps every value into its valid range.
    pub(crate) fn clamped(mut values: [f32; WEIGHT_COUNT]) -> Self {
        for (index, value) in values.iter_mut().enumerate() {
            let range = Self::range_of(index);
            *value = value.clamp(*range.start(), *range.end());
        }
        Self(values)
    }

    /// Draws a random weight vector.
    ///
    /// The threshold is uniform in `[0, 1]`. Each preference has a uniform
    /// magnitude in `[0, 1]` and is negative one time in four.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut values = [0.0; WEIGHT_COUNT];
        values[0] = rng.random_range(THRESHOLD_RANGE);
        for value in &mut values[1..] {
            let magnitude: f32 = rng.random_range(0.0..=1.0);
            *value = if rng.random_bool(SPAWN_NEGATIVE_WEIGHT_PROBABILITY) {
                -magnitude
            } else {
                magnitude
            };
        }
        Self(values)
    }

    const fn range_of(index: usize) -> RangeInclusive<f32> {
        if index == 0 {
            THRESHOLD_RANGE
        } else {
            PREFERENCE_RANGE
        }
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f32; WEIGHT_COUNT] {
        &self.0
    }

    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.0[0]
    }

    /// Element-wise average of two weight vectors.
    #[must_use]
    pub fn average(&self, other: &Self) -> Self {
        let mut values = self.0;
        for (value, other) in values.iter_mut().zip(other.0) {
            *value = (*value + other) / 2.0;
        }
        // the average of two in-range values is in range
        Self(values)
    }

    /// Arithmetic mean of all eight weights, used in short descriptions.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f32 {
        self.0.iter().sum::<f32>() / WEIGHT_COUNT as f32
    }

    /// Named view of the weights, in the order rule builders expect them.
    #[must_use]
    pub const fn hint_weighting(&self) -> HintWeighting {
        let [
            utility_threshold,
            more_cards,
            value_over_colour,
            colour_over_value,
            higher_values,
            revealing_playable,
            revealing_useless,
            nearer_future_playable,
        ] = self.0;
        HintWeighting {
            utility_threshold,
            more_cards,
            value_over_colour,
            colour_over_value,
            higher_values,
            revealing_playable,
            revealing_useless,
            nearer_future_playable,
        }
    }
}

/// The eight gene weights by role.
///
/// Preferences are added to a hint's utility score when the hint has the
/// named property; negative values make the property undesirable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HintWeighting {
    /// Minimum utility (or playability) required before the rule acts.
    pub utility_threshold: f32,
    /// Preference for hints that touch more cards.
    pub more_cards: f32,
    /// Preference for value hints over colour hints.
    pub value_over_colour: f32,
    /// Preference for colour hints over value hints.
    pub colour_over_value: f32,
    /// Preference for hinting higher values.
    pub higher_values: f32,
    /// Preference for hints that reveal a playable card.
    pub revealing_playable: f32,
    /// Preference for hints that reveal a useless card.
    pub revealing_useless: f32,
    /// Preference for hints about cards that become playable sooner.
    pub nearer_future_playable: f32,
}

/// One conditional rule of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gene {
    kind: RuleKind,
    lives: GuardRange,
    hints: GuardRange,
    weights: Weights,
}

impl Gene {
    #[must_use]
    pub const fn new(kind: RuleKind, lives: GuardRange, hints: GuardRange, weights: Weights) -> Self {
        Self {
            kind,
            lives,
            hints,
            weights,
        }
    }

    /// Spawns a gene with a random rule kind, random guards, and random weights.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            kind: RuleKind::random(rng),
            lives: random_lives_range(rng),
            hints: random_hints_range(rng),
            weights: Weights::random(rng),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        self.kind
    }

    #[must_use]
    pub const fn lives(&self) -> GuardRange {
        self.lives
    }

    #[must_use]
    pub const fn hints(&self) -> GuardRange {
        self.hints
    }

    #[must_use]
    pub const fn weights(&self) -> &Weights {
        &self.weights
    }

    #[must_use]
    pub(crate) const fn with_kind(self, kind: RuleKind) -> Self {
        Self { kind, ..self }
    }

    #[must_use]
    pub(crate) const fn with_guards(self, lives: GuardRange, hints: GuardRange) -> Self {
        Self {
            lives,
            hints,
            ..self
        }
    }

    #[must_use]
    pub(crate) const fn with_weights(self, weights: Weights) -> Self {
        Self { weights, ..self }
    }
}

/// Short form: `TAP[1-3|0-8](0.214)`, with the mean weight in parentheses.
impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}|{}]({:.3})",
            self.kind,
            self.lives,
            self.hints,
            self.weights.mean()
        )
    }
}

/// Draws a lives-remaining guard: two bounds from [`LIVES_SAMPLE_RANGE`], ordered.
pub fn random_lives_range<R>(rng: &mut R) -> GuardRange
where
    R: Rng + ?Sized,
{
    random_guard(rng, LIVES_SAMPLE_RANGE)
}

/// Draws a hints-remaining guard: two bounds from [`HINTS_SAMPLE_RANGE`], ordered.
pub fn random_hints_range<R>(rng: &mut R) -> GuardRange
where
    R: Rng + ?Sized,
{
    random_guard(rng, HINTS_SAMPLE_RANGE)
}

fn random_guard<R>(rng: &mut R, sample: RangeInclusive<u8>) -> GuardRange
where
    R: Rng + ?Sized,
{
    let a = rng.random_range(sample.clone());
    let b = rng.random_range(sample);
    GuardRange::new(a, b)
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    /// Asserts the weight-range invariant for a gene.
    pub(crate) fn assert_weights_in_range(gene: &Gene) {
        let weights = gene.weights().as_array();
        assert_eq!(weights.len(), WEIGHT_COUNT);
        assert!(
            THRESHOLD_RANGE.contains(&weights[0]),
            "threshold out of range: {weights:?}"
        );
        for w in &weights[1..] {
            assert!(
                PREFERENCE_RANGE.contains(w),
                "preference out of range: {weights:?}"
            );
        }
    }

    mod rule_kind {
        use super::*;

        #[test]
        fn test_tags_roundtrip() {
            for kind in RuleKind::ALL {
                assert_eq!(kind.tag().parse::<RuleKind>().unwrap(), kind);
            }
        }

        #[test]
        fn test_signed_aliases() {
            assert_eq!(
                "TA+".parse::<RuleKind>().unwrap(),
                RuleKind::TellAnyoneUseful
            );
            assert_eq!(
                "TA-".parse::<RuleKind>().unwrap(),
                RuleKind::TellAnyoneUseless
            );
        }

        #[test]
        fn test_unknown_tag() {
            let err = "XYZ".parse::<RuleKind>().unwrap_err();
            assert_eq!(err.to_string(), "unknown rule kind 'XYZ'");
        }

        #[test]
        fn test_random_covers_every_kind() {
            let mut rng = Pcg32::seed_from_u64(1);
            let mut seen = [false; RuleKind::ALL.len()];
            for _ in 0..500 {
                let kind = RuleKind::random(&mut rng);
                let index = RuleKind::ALL.iter().position(|k| *k == kind).unwrap();
                seen[index] = true;
            }
            assert!(seen.iter().all(|s| *s));
        }
    }

    mod weights {
        use super::*;

        #[test]
        fn test_from_slice_rejects_wrong_length() {
            assert_eq!(
                Weights::from_slice(&[0.5; 7]),
                Err(WeightsError::WrongLength { actual: 7 })
            );
            assert_eq!(
                Weights::from_slice(&[0.5; 9]),
                Err(WeightsError::WrongLength { actual: 9 })
            );
            assert!(Weights::from_slice(&[0.5; 8]).is_ok());
        }

        #[test]
        fn test_negative_threshold_is_rejected() {
            let mut values = [0.0; WEIGHT_COUNT];
            values[0] = -0.1;
            assert!(matches!(
                Weights::new(values),
                Err(WeightsError::OutOfRange { index: 0, .. })
            ));

            values[0] = 0.1;
            values[3] = -1.0;
            assert!(Weights::new(values).is_ok());
            values[3] = 1.5;
            assert!(matches!(
                Weights::new(values),
                Err(WeightsError::OutOfRange { index: 3, .. })
            ));
        }

        #[test]
        fn test_clamped() {
            let weights = Weights::clamped([1.2, -3.0, 0.5, 2.0, 0.0, 0.0, 0.0, -0.5]);
            assert_eq!(
                weights.as_array(),
                &[1.0, -1.0, 0.5, 1.0, 0.0, 0.0, 0.0, -0.5]
            );
        }

        #[test]
        fn test_average_is_elementwise() {
            let a = Weights::new([0.2, 0.4, -0.6, 1.0, 0.0, 0.5, -1.0, 0.25]).unwrap();
            let b = Weights::new([0.6, -0.4, 0.2, 0.0, 1.0, 0.5, 1.0, 0.75]).unwrap();
            let expected = [0.4, 0.0, -0.2, 0.5, 0.5, 0.5, 0.0, 0.5];
            for (actual, expected) in a.average(&b).as_array().iter().zip(expected) {
                assert!((actual - expected).abs() < 1e-6);
            }
        }

        #[test]
        fn test_random_negative_preferences_are_rarer() {
            let mut rng = Pcg32::seed_from_u64(7);
            let mut negative = 0;
            let mut total = 0;
            for _ in 0..2000 {
                let weights = Weights::random(&mut rng);
                for w in &weights.as_array()[1..] {
                    total += 1;
                    if *w < 0.0 {
                        negative += 1;
                    }
                }
            }
            let ratio = f64::from(negative) / f64::from(total);
            assert!((0.2..0.3).contains(&ratio), "negative ratio {ratio}");
        }

        #[test]
        fn test_hint_weighting_order() {
            let weights = Weights::new([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]).unwrap();
            let named = weights.hint_weighting();
            assert_eq!(named.utility_threshold, 0.1);
            assert_eq!(named.more_cards, 0.2);
            assert_eq!(named.colour_over_value, 0.4);
            assert_eq!(named.nearer_future_playable, 0.8);
        }
    }

    mod spawn {
        use super::*;

        #[test]
        fn test_random_genes_satisfy_invariants() {
            let mut rng = Pcg32::seed_from_u64(42);
            for _ in 0..1000 {
                let gene = Gene::random(&mut rng);
                assert_weights_in_range(&gene);
                assert!(gene.lives().lo() <= gene.lives().hi());
                assert!(gene.hints().lo() <= gene.hints().hi());
                assert!(LIVES_SAMPLE_RANGE.contains(&gene.lives().lo()));
                assert!(LIVES_SAMPLE_RANGE.contains(&gene.lives().hi()));
                assert!(HINTS_SAMPLE_RANGE.contains(&gene.hints().hi()));
            }
        }

        #[test]
        fn test_short_display() {
            let gene = Gene::new(
                RuleKind::TellAnyonePlayable,
                GuardRange::new(1, 3),
                GuardRange::new(0, 8),
                Weights::new([0.5; WEIGHT_COUNT]).unwrap(),
            );
            assert_eq!(gene.to_string(), "TAP[1-3|0-8](0.500)");
        }
    }
}
