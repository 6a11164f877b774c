//! Agent-side building blocks for evolved card-game policies.
//!
//! An agent is a chain of decision rules. Each rule looks at the current game
//! view and either proposes an action or passes. The first rule that proposes
//! an action wins; if every rule passes, a fallback rule decides.
//!
//! # Architecture
//!
//! ```text
//! RuleChain (one agent, one seat)
//!     ↓ evaluates in order
//! GuardedRule (active only for certain lives/hints remaining)
//!     ↓ delegates to
//! DecisionRule (built from a gene by an external rule builder)
//!     ↓ falls through to
//! FallbackRule (always decides)
//! ```
//!
//! The concrete rules (play a safe card, hint a playable card, discard, ...)
//! and the game engine itself live outside this workspace. This crate only
//! fixes the contract they meet:
//!
//! - [`game::GameView`] - what a rule can observe
//! - [`rule::DecisionRule`] / [`rule::FallbackRule`] - what a rule returns
//! - [`guard::GuardRange`] - inclusive integer guard on a game counter
//! - [`rule::RuleChain`] - first-match-wins composition
//!
//! # Example
//!
//! ```
//! use oxihana_policy::{
//!     game::GameView,
//!     guard::GuardRange,
//!     rule::{DecisionRule, FallbackRule, GuardedRule, RuleChain},
//! };
//!
//! struct View {
//!     lives: u8,
//!     hints: u8,
//! }
//!
//! impl GameView for View {
//!     type Action = &'static str;
//!     fn lives_remaining(&self) -> u8 {
//!         self.lives
//!     }
//!     fn hints_remaining(&self) -> u8 {
//!         self.hints
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Hint;
//! impl DecisionRule<View> for Hint {
//!     fn evaluate(&self, _view: &View) -> Option<&'static str> {
//!         Some("hint")
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Discard;
//! impl FallbackRule<View> for Discard {
//!     fn decide(&self, _view: &View) -> &'static str {
//!         "discard"
//!     }
//! }
//!
//! let hint_while_possible = GuardedRule::<View>::new(
//!     GuardRange::new(1, 3),
//!     GuardRange::new(1, 8),
//!     Box::new(Hint),
//! );
//! let agent = RuleChain::<View>::new(vec![Box::new(hint_while_possible)], Box::new(Discard));
//!
//! assert_eq!(agent.decide(&View { lives: 3, hints: 2 }), "hint");
//! assert_eq!(agent.decide(&View { lives: 3, hints: 0 }), "discard");
//! ```

pub mod game;
pub mod guard;
pub mod rule;
