//! Core `State` trait and the lifecycle contract applied to every state.
//!
//! States only implement behavior. The wake-once, idempotent enter and
//! idempotent exit rules are enforced by [`Lifecycle`], which the owning
//! machine (or the driver, for the root) keeps next to each hosted state.

use super::scope::Scope;
use crate::observe::Inspect;

/// Behavior of one node in a state tree.
///
/// Every hook receives a [`Scope`] giving access to the shared context `C`
/// and to transition requests on the owning machine. All hooks default to
/// doing nothing, so a state overrides only what it needs.
///
/// Hooks run in this order over a state's life:
///
/// - `on_wake` once, immediately before the first `on_enter`
/// - `on_enter` each time the state becomes active
/// - `on_update` once per tick while active
/// - `on_exit` each time the state stops being active
///
/// [`StateMachine`](crate::machine::StateMachine) implements this trait too,
/// which is how machines nest.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{Scope, State};
///
/// struct Countdown {
///     remaining_ms: i64,
/// }
///
/// impl State<()> for Countdown {
///     fn on_enter(&mut self, _scope: &mut Scope<'_, ()>) {
///         self.remaining_ms = 1500;
///     }
///
///     fn on_update(&mut self, scope: &mut Scope<'_, ()>, elapsed_ms: u64) {
///         self.remaining_ms -= elapsed_ms as i64;
///         if self.remaining_ms <= 0 {
///             scope.next();
///         }
///     }
/// }
/// ```
pub trait State<C> {
    /// One-time initialization, deferred until the state is first entered.
    fn on_wake(&mut self, _scope: &mut Scope<'_, C>) {}

    /// The state became active.
    fn on_enter(&mut self, _scope: &mut Scope<'_, C>) {}

    /// One tick of elapsed time while active.
    fn on_update(&mut self, _scope: &mut Scope<'_, C>, _elapsed_ms: u64) {}

    /// The state stopped being active.
    fn on_exit(&mut self, _scope: &mut Scope<'_, C>) {}

    /// Read-only view for states that host their own children.
    fn inspect(&self) -> Option<&dyn Inspect> {
        None
    }
}

/// The `awoken` and `active` flags of a hosted state.
///
/// `awoken` flips to `true` exactly once and stays there. `active` is only
/// set by an `enter` from inactive and only cleared by an `exit` from
/// active, so repeated calls are no-ops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lifecycle {
    awoken: bool,
    active: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_awoken(&self) -> bool {
        self.awoken
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate `state`, waking it first if this is its first entry.
    ///
    /// Returns `false` if the state was already active.
    pub fn enter<C, S>(&mut self, state: &mut S, scope: &mut Scope<'_, C>) -> bool
    where
        S: State<C> + ?Sized,
    {
        if self.active {
            return false;
        }
        if !self.awoken {
            self.awoken = true;
            state.on_wake(scope);
        }
        self.active = true;
        state.on_enter(scope);
        true
    }

    /// Forward one tick to `state` if it is active.
    pub fn update<C, S>(&mut self, state: &mut S, scope: &mut Scope<'_, C>, elapsed_ms: u64) -> bool
    where
        S: State<C> + ?Sized,
    {
        if !self.active {
            return false;
        }
        state.on_update(scope, elapsed_ms);
        true
    }

    /// Deactivate `state`.
    ///
    /// Returns `false` if the state was not active.
    pub fn exit<C, S>(&mut self, state: &mut S, scope: &mut Scope<'_, C>) -> bool
    where
        S: State<C> + ?Sized,
    {
        if !self.active {
            return false;
        }
        self.active = false;
        state.on_exit(scope);
        true
    }
}
