use std::fmt;

use crate::{game::GameView, guard::GuardRange};

/// A rule that may propose an action for the current turn.
///
/// Returning `None` passes the decision to the next rule in the chain.
pub trait DecisionRule<V>: fmt::Debug + Send
where
    V: GameView,
{
    fn evaluate(&self, view: &V) -> Option<V::Action>;
}

/// The last rule of a chain. It must always produce an action.
pub trait FallbackRule<V>: fmt::Debug + Send
where
    V: GameView,
{
    fn decide(&self, view: &V) -> V::Action;
}

pub type BoxedDecisionRule<V> = Box<dyn DecisionRule<V>>;
pub type BoxedFallbackRule<V> = Box<dyn FallbackRule<V>>;

/// Activates an inner rule only while both game counters lie inside their
/// guard ranges.
pub struct GuardedRule<V>
where
    V: GameView,
{
    lives: GuardRange,
    hints: GuardRange,
    rule: BoxedDecisionRule<V>,
}

impl<V> GuardedRule<V>
where
    V: GameView,
{
    #[must_use]
    pub fn new(lives: GuardRange, hints: GuardRange, rule: BoxedDecisionRule<V>) -> Self {
        Self { lives, hints, rule }
    }

    #[must_use]
    pub fn is_active(&self, view: &V) -> bool {
        self.lives.contains(view.lives_remaining()) && self.hints.contains(view.hints_remaining())
    }
}

impl<V> fmt::Debug for GuardedRule<V>
where
    V: GameView,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedRule")
            .field("lives", &self.lives)
            .field("hints", &self.hints)
            .field("rule", &self.rule)
            .finish()
    }
}

impl<V> DecisionRule<V> for GuardedRule<V>
where
    V: GameView,
{
    fn evaluate(&self, view: &V) -> Option<V::Action> {
        if self.is_active(view) {
            self.rule.evaluate(view)
        } else {
            None
        }
    }
}

/// First-match-wins composition of rules, closed by a fallback.
///
/// This is the complete policy of one seated agent.
pub struct RuleChain<V>
where
    V: GameView,
{
    rules: Vec<BoxedDecisionRule<V>>,
    fallback: BoxedFallbackRule<V>,
}

impl<V> RuleChain<V>
where
    V: GameView,
{
    #[must_use]
    pub fn new(rules: Vec<BoxedDecisionRule<V>>, fallback: BoxedFallbackRule<V>) -> Self {
        Self { rules, fallback }
    }

    /// Number of rules before the fallback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates the rules in order and returns the first proposed action, or
    /// the fallback's action if every rule passes.
    pub fn decide(&self, view: &V) -> V::Action {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(view))
            .unwrap_or_else(|| self.fallback.decide(view))
    }
}

impl<V> fmt::Debug for RuleChain<V>
where
    V: GameView,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleChain")
            .field("rules", &self.rules)
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[derive(Debug)]
    struct View {
        lives: u8,
        hints: u8,
    }

    impl GameView for View {
        type Action = u32;

        fn lives_remaining(&self) -> u8 {
            self.lives
        }

        fn hints_remaining(&self) -> u8 {
            self.hints
        }
    }

    #[derive(Debug)]
    struct Fixed(Option<u32>);

    impl DecisionRule<View> for Fixed {
        fn evaluate(&self, _view: &View) -> Option<u32> {
            self.0
        }
    }

    #[derive(Debug)]
    struct Counting {
        calls: Arc<AtomicUsize>,
        action: Option<u32>,
    }

    impl DecisionRule<View> for Counting {
        fn evaluate(&self, _view: &View) -> Option<u32> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.action
        }
    }

    #[derive(Debug)]
    struct Fallback;

    impl FallbackRule<View> for Fallback {
        fn decide(&self, _view: &View) -> u32 {
            0
        }
    }

    fn view(lives: u8, hints: u8) -> View {
        View { lives, hints }
    }

    #[test]
    fn test_first_match_wins() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let chain = RuleChain::<View>::new(
            vec![
                Box::new(Fixed(None)),
                Box::new(Fixed(Some(7))),
                Box::new(Counting {
                    calls: Arc::clone(&later_calls),
                    action: Some(9),
                }),
            ],
            Box::new(Fallback),
        );
        assert_eq!(chain.decide(&view(3, 8)), 7);
        assert_eq!(later_calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_fallback_decides_when_all_pass() {
        let chain = RuleChain::<View>::new(
            vec![Box::new(Fixed(None)), Box::new(Fixed(None))],
            Box::new(Fallback),
        );
        assert_eq!(chain.decide(&view(1, 0)), 0);

        let empty = RuleChain::<View>::new(vec![], Box::new(Fallback));
        assert!(empty.is_empty());
        assert_eq!(empty.decide(&view(1, 0)), 0);
    }

    #[test]
    fn test_guard_blocks_inner_rule_outside_ranges() {
        let calls = Arc::new(AtomicUsize::new(0));
        let guarded = GuardedRule::<View>::new(
            GuardRange::new(2, 3),
            GuardRange::new(1, 8),
            Box::new(Counting {
                calls: Arc::clone(&calls),
                action: Some(5),
            }),
        );

        assert_eq!(guarded.evaluate(&view(1, 4)), None);
        assert_eq!(guarded.evaluate(&view(3, 0)), None);
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        assert_eq!(guarded.evaluate(&view(2, 8)), Some(5));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    /// Boxes guarded rules for any view type, as agent builders do.
    fn guard_all<V>(rules: Vec<BoxedDecisionRule<V>>, lives: GuardRange) -> Vec<BoxedDecisionRule<V>>
    where
        V: GameView,
    {
        rules
            .into_iter()
            .map(|rule| {
                Box::new(GuardedRule::new(lives, GuardRange::new(0, 8), rule)) as BoxedDecisionRule<V>
            })
            .collect()
    }

    #[test]
    fn test_generic_guarded_chain() {
        let rules = guard_all::<View>(
            vec![Box::new(Fixed(Some(4))), Box::new(Fixed(Some(6)))],
            GuardRange::new(2, 3),
        );
        let chain = RuleChain::new(rules, Box::new(Fallback));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.decide(&view(3, 5)), 4);
        assert_eq!(chain.decide(&view(1, 5)), 0);
    }
}
