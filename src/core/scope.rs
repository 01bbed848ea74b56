//! The handle a running state receives from its owning machine.

use super::identity::StateId;
use super::registry::Registry;
use super::transition::{
    PendingEdge, TransitionRejected, TransitionRequest, TransitionTable, DEFAULT_TRANSITION,
};
use crate::observe::MachineObserver;

/// Requests a machine's children leave for it between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Signals {
    /// Edge accepted this tick, committed on the next update.
    pub(crate) pending: Option<PendingEdge>,
    /// A child asked this machine to deactivate itself.
    pub(crate) exit_requested: bool,
    /// A child machine asked to be deactivated by this machine.
    pub(crate) release_requested: bool,
}

impl Signals {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

struct Routes<'a, C> {
    registry: &'a Registry,
    transitions: &'a TransitionTable<C>,
}

/// Access to the shared context and to the owning machine's transitions.
///
/// A scope is only valid for the duration of one hook call. It stands in
/// for a back-reference to the owning machine: states read and write the
/// shared context through it and ask for transitions, but cannot reach any
/// other machine internals.
pub struct Scope<'a, C> {
    context: &'a mut C,
    observer: Option<&'a dyn MachineObserver>,
    tick: u64,
    machine: &'a str,
    active: Option<StateId>,
    routes: Option<Routes<'a, C>>,
    signals: &'a mut Signals,
}

impl<'a, C> Scope<'a, C> {
    /// Scope handed to a root machine by its driver. It has no siblings, so
    /// every transition request from it is rejected.
    pub(crate) fn root(
        context: &'a mut C,
        observer: Option<&'a dyn MachineObserver>,
        tick: u64,
        signals: &'a mut Signals,
    ) -> Self {
        Self {
            context,
            observer,
            tick,
            machine: "",
            active: None,
            routes: None,
            signals,
        }
    }

    /// Scope for the children of a machine, borrowing from the machine's
    /// own scope.
    pub(crate) fn nested<'s>(
        &'s mut self,
        machine: &'s str,
        registry: &'s Registry,
        transitions: &'s TransitionTable<C>,
        signals: &'s mut Signals,
        active: Option<StateId>,
    ) -> Scope<'s, C> {
        Scope {
            context: &mut *self.context,
            observer: self.observer,
            tick: self.tick,
            machine,
            active,
            routes: Some(Routes {
                registry,
                transitions,
            }),
            signals,
        }
    }

    pub fn context(&self) -> &C {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut *self.context
    }

    /// Number of the tick being processed, as counted by the driver.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Label of the machine that owns the current state.
    pub fn machine(&self) -> &str {
        self.machine
    }

    /// Name of the owning machine's active child, if any.
    pub fn active_state(&self) -> Option<&str> {
        let routes = self.routes.as_ref()?;
        self.active.map(|id| routes.registry.name_of(id))
    }

    /// Whether the owning machine already holds an accepted transition.
    pub fn has_pending_transition(&self) -> bool {
        self.signals.pending.is_some()
    }

    /// Request the edge called `name` from the active state.
    pub fn transition(&mut self, name: &str) -> bool {
        self.try_transition(TransitionRequest::Named(name)).is_ok()
    }

    /// Request the default (unnamed) edge from the active state.
    pub fn next(&mut self) -> bool {
        self.transition(DEFAULT_TRANSITION)
    }

    /// Request the edge from the active state to the state called `target`.
    pub fn transition_to(&mut self, target: &str) -> bool {
        self.try_transition(TransitionRequest::To(target)).is_ok()
    }

    /// Like [`transition`](Self::transition), but replaces an edge that is
    /// already pending instead of being rejected by it.
    pub fn force_transition(&mut self, name: &str) -> bool {
        self.request(TransitionRequest::Named(name), true).is_ok()
    }

    /// Request a transition and report why it was not accepted.
    ///
    /// On success the edge is pending and commits on the owning machine's
    /// next update.
    pub fn try_transition(
        &mut self,
        request: TransitionRequest<'_>,
    ) -> Result<(), TransitionRejected> {
        self.request(request, false)
    }

    /// Ask the owning machine to deactivate itself once the current call
    /// returns.
    pub fn exit_machine(&mut self) {
        tracing::debug!(machine = %self.machine, "machine exit requested");
        self.signals.exit_requested = true;
    }

    pub(crate) fn observer(&self) -> Option<&'a dyn MachineObserver> {
        self.observer
    }

    /// Ask whoever holds the machine running in this scope to deactivate it.
    pub(crate) fn request_release(&mut self) {
        self.signals.release_requested = true;
    }

    fn request(
        &mut self,
        request: TransitionRequest<'_>,
        force: bool,
    ) -> Result<(), TransitionRejected> {
        let outcome = self.resolve(request, force);
        match outcome {
            Ok(pending) => {
                self.signals.pending = Some(pending);
                tracing::debug!(
                    machine = %self.machine,
                    from = self.active_state().unwrap_or_default(),
                    %request,
                    force,
                    "transition accepted"
                );
            }
            Err(reason) => {
                tracing::debug!(
                    machine = %self.machine,
                    from = self.active_state().unwrap_or_default(),
                    %request,
                    %reason,
                    "transition rejected"
                );
            }
        }
        outcome.map(|_| ())
    }

    fn resolve(
        &self,
        request: TransitionRequest<'_>,
        force: bool,
    ) -> Result<PendingEdge, TransitionRejected> {
        let from = self.active.ok_or(TransitionRejected::NoActiveState)?;
        let routes = self
            .routes
            .as_ref()
            .ok_or(TransitionRejected::NoActiveState)?;
        if self.signals.pending.is_some() && !force {
            return Err(TransitionRejected::AlreadyPending);
        }
        routes.transitions.resolve(from, request, &*self.context)
    }
}
