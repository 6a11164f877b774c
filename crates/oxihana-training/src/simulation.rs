//! Boundary between the optimizer and the game.
//!
//! The optimizer never sees game rules. It needs exactly two collaborators:
//!
//! - a [`RuleBuilder`] that turns one gene into one concrete decision rule for
//!   a given seat, plus the fallback rule that closes every chain, and
//! - a [`GameSimulator`] that plays one complete game with the seated agents
//!   and returns the final score.
//!
//! Both are shared by every worker thread of an evaluation, so they must be
//! [`Sync`]. Rules and agents themselves are built fresh per game and only
//! need to be [`Send`].
//!
//! A simulator may return a negative score as a sentinel for an internal rule
//! violation. The evaluator records it like any other score and logs a
//! warning; an `Err` is reserved for games that could not be completed at all.

use oxihana_policy::{
    game::GameView,
    rule::{BoxedDecisionRule, BoxedFallbackRule, RuleChain},
};

use crate::gene::Gene;

/// Builds concrete decision rules from genes.
///
/// Implementations dispatch on [`Gene::kind`] with an exhaustive match and
/// read tuning parameters from [`Weights::hint_weighting`].
///
/// [`Weights::hint_weighting`]: crate::gene::Weights::hint_weighting
pub trait RuleBuilder<V>: Sync
where
    V: GameView,
{
    /// Builds the rule for `gene` as played from `seat`.
    ///
    /// Guards are applied by the caller; the returned rule should ignore
    /// [`Gene::lives`] and [`Gene::hints`].
    fn build_rule(&self, gene: &Gene, seat: usize) -> BoxedDecisionRule<V>;

    /// Builds the rule that decides when no gene rule fires.
    fn build_fallback(&self, seat: usize) -> BoxedFallbackRule<V>;
}

/// Plays complete games.
pub trait GameSimulator: Sync {
    type View: GameView;

    /// Plays one game with one agent per seat and returns the final score.
    ///
    /// # Errors
    ///
    /// Returns an error if the game could not be played to completion.
    fn simulate(&self, agents: Vec<RuleChain<Self::View>>) -> Result<i32, SimulationError>;
}

/// A game that the simulator could not complete.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("simulation failed: {message}")]
pub struct SimulationError {
    message: String,
}

impl SimulationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
