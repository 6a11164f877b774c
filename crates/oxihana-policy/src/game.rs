/// Read-only view of the game from one seat's perspective.
///
/// Rules only need the two shared counters that gene guards test against;
/// everything else a concrete rule inspects is reached through the
/// implementing type.
///
/// Views are `'static` so that rules over them can be boxed as
/// [`BoxedDecisionRule`](crate::rule::BoxedDecisionRule) trait objects.
pub trait GameView: 'static {
    /// The action a seat submits on its turn.
    type Action;

    /// Number of lives (fuse tokens) the team has left.
    fn lives_remaining(&self) -> u8;

    /// Number of hint tokens the team has left.
    fn hints_remaining(&self) -> u8;
}
