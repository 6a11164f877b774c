//! Truncation selection.
//!
//! Records are ranked by descending mean score and the top
//! `floor(N × (1 − extinction_rate))` are kept. Records with equal means stay
//! adjacent, in evaluation order, and the cut may fall inside such a group:
//! the survivor count is exact, the order inside a tie is not meaningful.

use crate::fitness::FitnessRecord;

/// Number of survivors among `evaluated` records.
#[must_use]
pub fn survivor_count(evaluated: usize, extinction_rate: f64) -> usize {
    #[expect(clippy::cast_precision_loss)]
    let n = evaluated as f64;
    // n - n × rate keeps products like 10 × 0.3 exact, where n × (1 − rate) would not
    let kept = n - n * extinction_rate.clamp(0.0, 1.0);
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = kept.floor().max(0.0) as usize;
    count.min(evaluated)
}

/// Sorts `records` best first.
pub fn rank(records: &mut [FitnessRecord]) {
    records.sort_by(|a, b| b.mean().total_cmp(&a.mean()));
}

/// Ranks `records` and drops the worst `extinction_rate` share of them.
#[must_use]
pub fn truncate(mut records: Vec<FitnessRecord>, extinction_rate: f64) -> Vec<FitnessRecord> {
    let count = survivor_count(records.len(), extinction_rate);
    rank(&mut records);
    records.truncate(count);
    records
}
