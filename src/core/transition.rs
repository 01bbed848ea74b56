//! Transition edges and the per-machine edge table.

use super::guard::Guard;
use super::identity::StateId;
use std::collections::HashMap;
use std::fmt;

/// Reserved edge name meaning "the unnamed default edge from this source".
pub const DEFAULT_TRANSITION: &str = "__next__";

/// Action run once when an edge is committed.
pub type TransitionCallback<C> = Box<dyn FnMut(&mut C)>;

/// A named, directed permission to move from one sibling state to another.
///
/// Edges are declared with state names; the owning machine resolves them
/// against its registry when the edge is added.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{TransitionEdge, DEFAULT_TRANSITION};
///
/// struct Signal {
///     cycles: u32,
/// }
///
/// let next: TransitionEdge<Signal> = TransitionEdge::new("Green", "Yellow");
/// assert_eq!(next.name(), DEFAULT_TRANSITION);
/// assert!(next.is_default());
///
/// let wrap = TransitionEdge::new("Red", "Green")
///     .named("cycle")
///     .on_commit(|signal: &mut Signal| signal.cycles += 1);
/// assert_eq!(wrap.name(), "cycle");
/// assert!(wrap.has_callback());
/// ```
pub struct TransitionEdge<C> {
    name: String,
    from: String,
    to: String,
    guard: Option<Guard<C>>,
    callback: Option<TransitionCallback<C>>,
}

impl<C> TransitionEdge<C> {
    /// Default-named edge from `from` to `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_TRANSITION.to_string(),
            from: from.into(),
            to: to.into(),
            guard: None,
            callback: None,
        }
    }

    /// Give the edge an explicit name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Only allow the edge while `guard` passes.
    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Run `callback` once each time this edge is committed, after the
    /// destination state has been entered.
    pub fn on_commit<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut C) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_TRANSITION
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Whether the guard, if any, allows this edge for `context`.
    pub fn allows(&self, context: &C) -> bool {
        self.guard.as_ref().map_or(true, |g| g.check(context))
    }

    pub(crate) fn fire(&mut self, context: &mut C) -> bool {
        match self.callback.as_mut() {
            Some(callback) => {
                callback(context);
                true
            }
            None => false,
        }
    }
}

impl<C> fmt::Debug for TransitionEdge<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEdge")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("guarded", &self.has_guard())
            .field("callback", &self.has_callback())
            .finish()
    }
}

/// How a state asks for a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionRequest<'a> {
    /// Exact `(from, name)` match. The default edge is
    /// `Named(DEFAULT_TRANSITION)`.
    Named(&'a str),
    /// The edge from the active state whose destination is this state name.
    To(&'a str),
}

impl fmt::Display for TransitionRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "edge '{name}'"),
            Self::To(target) => write!(f, "edge to '{target}'"),
        }
    }
}

/// Why a transition request did not become pending.
///
/// These are outcomes, not failures: the request simply did not happen this
/// tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejected {
    #[error("machine has no active state")]
    NoActiveState,

    #[error("a transition is already pending")]
    AlreadyPending,

    #[error("no matching edge from the active state")]
    NoMatchingEdge,

    #[error("edge guard rejected the transition")]
    GuardRejected,
}

/// Reference to an edge accepted for commit on the next update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingEdge {
    pub(crate) from: StateId,
    pub(crate) index: usize,
}

pub(crate) struct Edge<C> {
    pub(crate) to: StateId,
    pub(crate) declared: TransitionEdge<C>,
}

/// Outgoing edges of every state in one machine, in declaration order.
pub struct TransitionTable<C> {
    edges: HashMap<StateId, Vec<Edge<C>>>,
}

impl<C> Default for TransitionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TransitionTable<C> {
    pub fn new() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }

    /// Whether an edge with the same `(from, name)` or `(from, to)` exists.
    pub(crate) fn conflicts(&self, from: StateId, name: &str, to: StateId) -> bool {
        self.edges
            .get(&from)
            .is_some_and(|edges| edges.iter().any(|e| e.declared.name == name || e.to == to))
    }

    pub(crate) fn insert(&mut self, from: StateId, to: StateId, declared: TransitionEdge<C>) {
        self.edges.entry(from).or_default().push(Edge { to, declared });
    }

    /// Find the edge `request` selects from `from`, honoring guards.
    pub(crate) fn resolve(
        &self,
        from: StateId,
        request: TransitionRequest<'_>,
        context: &C,
    ) -> Result<PendingEdge, TransitionRejected> {
        let edges = self
            .edges
            .get(&from)
            .ok_or(TransitionRejected::NoMatchingEdge)?;

        let index = edges
            .iter()
            .position(|edge| match request {
                TransitionRequest::Named(name) => edge.declared.name == name,
                TransitionRequest::To(target) => edge.declared.to == target,
            })
            .ok_or(TransitionRejected::NoMatchingEdge)?;

        if !edges[index].declared.allows(context) {
            return Err(TransitionRejected::GuardRejected);
        }

        Ok(PendingEdge { from, index })
    }

    pub(crate) fn edge(&self, pending: PendingEdge) -> Option<&Edge<C>> {
        self.edges.get(&pending.from)?.get(pending.index)
    }

    pub(crate) fn edge_mut(&mut self, pending: PendingEdge) -> Option<&mut Edge<C>> {
        self.edges.get_mut(&pending.from)?.get_mut(pending.index)
    }

    /// Outgoing edges of `from`, in declaration order.
    pub fn outgoing(&self, from: StateId) -> impl Iterator<Item = &TransitionEdge<C>> {
        self.edges
            .get(&from)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|e| &e.declared))
    }

    /// Total number of edges in the table.
    pub fn len(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ctx {
        open: bool,
        commits: u32,
    }

    fn table() -> TransitionTable<Ctx> {
        let mut table = TransitionTable::new();
        table.insert(StateId::new(0), StateId::new(1), TransitionEdge::new("A", "B"));
        table.insert(
            StateId::new(0),
            StateId::new(2),
            TransitionEdge::new("A", "C")
                .named("open")
                .when(|c: &Ctx| c.open),
        );
        table
    }

    #[test]
    fn default_request_selects_unnamed_edge() {
        let table = table();
        let pending = table
            .resolve(
                StateId::new(0),
                TransitionRequest::Named(DEFAULT_TRANSITION),
                &Ctx::default(),
            )
            .unwrap();

        assert_eq!(table.edge(pending).unwrap().to, StateId::new(1));
    }

    #[test]
    fn target_request_selects_by_destination() {
        let table = table();
        let ctx = Ctx {
            open: true,
            ..Default::default()
        };
        let pending = table
            .resolve(StateId::new(0), TransitionRequest::To("C"), &ctx)
            .unwrap();

        assert_eq!(table.edge(pending).unwrap().declared.name(), "open");
    }

    #[test]
    fn unknown_name_is_rejected() {
        let table = table();
        let result = table.resolve(
            StateId::new(0),
            TransitionRequest::Named("missing"),
            &Ctx::default(),
        );
        assert_eq!(result, Err(TransitionRejected::NoMatchingEdge));

        let result = table.resolve(
            StateId::new(5),
            TransitionRequest::Named(DEFAULT_TRANSITION),
            &Ctx::default(),
        );
        assert_eq!(result, Err(TransitionRejected::NoMatchingEdge));
    }

    #[test]
    fn guard_blocks_until_context_allows() {
        let table = table();
        let closed = Ctx::default();
        let open = Ctx {
            open: true,
            ..Default::default()
        };

        assert_eq!(
            table.resolve(StateId::new(0), TransitionRequest::Named("open"), &closed),
            Err(TransitionRejected::GuardRejected)
        );
        assert!(table
            .resolve(StateId::new(0), TransitionRequest::Named("open"), &open)
            .is_ok());
    }

    #[test]
    fn conflicts_cover_name_and_destination() {
        let table = table();
        assert!(table.conflicts(StateId::new(0), DEFAULT_TRANSITION, StateId::new(3)));
        assert!(table.conflicts(StateId::new(0), "fresh", StateId::new(1)));
        assert!(!table.conflicts(StateId::new(0), "fresh", StateId::new(3)));
        assert!(!table.conflicts(StateId::new(1), DEFAULT_TRANSITION, StateId::new(0)));
    }

    #[test]
    fn fire_runs_callback_against_context() {
        let mut edge = TransitionEdge::new("A", "B").on_commit(|c: &mut Ctx| c.commits += 1);
        let mut ctx = Ctx::default();

        assert!(edge.fire(&mut ctx));
        assert!(edge.fire(&mut ctx));
        assert_eq!(ctx.commits, 2);

        let mut plain: TransitionEdge<Ctx> = TransitionEdge::new("A", "B");
        assert!(!plain.fire(&mut ctx));
    }

    #[test]
    fn outgoing_preserves_declaration_order() {
        let table = table();
        let names: Vec<&str> = table.outgoing(StateId::new(0)).map(|e| e.to()).collect();
        assert_eq!(names, vec!["B", "C"]);
        assert_eq!(table.outgoing(StateId::new(9)).count(), 0);
        assert_eq!(table.len(), 2);
    }
}
