//! The composite state machine.
//!
//! A [`StateMachine`] is a [`State`] that owns a set of child states and
//! drives exactly one of them at a time. Because it is itself a state, a
//! machine can be registered as the child of another machine, to any depth.
//!
//! # Tick protocol
//!
//! Each update does exactly one of two things:
//!
//! - if a transition is pending, commit it (exit the old child, enter the
//!   new one, run the edge callback) and return
//! - otherwise update the active child, then run the machine's own hook
//!
//! So a state never receives elapsed time in the tick that activated it,
//! and at most one transition commits per machine per tick. Requests made
//! while a tick is running wait for the next one.

mod builder;
pub mod error;
mod exit;

pub use builder::MachineBuilder;
pub use error::{BuildErrors, ConfigError};
pub use exit::ExitState;

use crate::core::scope::Signals;
use crate::core::{
    default_state_name, Lifecycle, PendingEdge, Registry, Scope, State, StateId, StateIdentity,
    TransitionEdge, TransitionTable,
};
use crate::observe::{EdgeRef, Inspect, TransitionRecord};
use chrono::Utc;
use std::fmt;

struct Slot<C> {
    lifecycle: Lifecycle,
    state: Box<dyn State<C>>,
}

/// A state that owns child states and drives one of them at a time.
///
/// Configure it with [`add_state`](Self::add_state),
/// [`add_transition`](Self::add_transition) and
/// [`set_initial_state`](Self::set_initial_state), then hand it to a
/// [`Driver`](crate::Driver) or register it inside another machine. Once the
/// machine has been moved there its tables can no longer change.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{Scope, State, TransitionEdge};
/// use tickstate::{Driver, StateMachine};
///
/// struct Idle;
/// impl State<u32> for Idle {
///     fn on_update(&mut self, scope: &mut Scope<'_, u32>, _elapsed_ms: u64) {
///         scope.next();
///     }
/// }
///
/// struct Busy;
/// impl State<u32> for Busy {
///     fn on_enter(&mut self, scope: &mut Scope<'_, u32>) {
///         *scope.context_mut() += 1;
///     }
/// }
///
/// let mut machine = StateMachine::new("worker");
/// machine.add_state(Idle).unwrap();
/// machine.add_state(Busy).unwrap();
/// machine.add_transition(TransitionEdge::new("Idle", "Busy")).unwrap();
/// machine.set_initial_state("Idle").unwrap();
///
/// let mut driver = Driver::new(machine, 0u32);
/// driver.enter();
/// driver.update(16); // Idle asks for the default edge
/// assert_eq!(driver.machine().current_state().unwrap().name(), "Idle");
/// driver.update(16); // the edge commits
/// assert_eq!(driver.machine().current_state().unwrap().name(), "Busy");
/// assert_eq!(*driver.context(), 1);
/// ```
pub struct StateMachine<C> {
    label: String,
    registry: Registry,
    slots: Vec<Slot<C>>,
    transitions: TransitionTable<C>,
    starting: Option<StateId>,
    current: Option<StateId>,
    signals: Signals,
    hooks: Option<Box<dyn State<C>>>,
}

impl<C> StateMachine<C> {
    /// Create an empty machine. `label` names it in logs, observer events
    /// and snapshots.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            registry: Registry::new(),
            slots: Vec::new(),
            transitions: TransitionTable::new(),
            starting: None,
            current: None,
            signals: Signals::default(),
            hooks: None,
        }
    }

    /// Give the machine its own behavior.
    ///
    /// The hooks run as this machine's part of the tree: the enter hook
    /// before the active child enters, the exit hook after it exits, the
    /// update hook after the child's update. Their scope belongs to the
    /// machine's parent, so a hook requests transitions among the machine's
    /// siblings.
    pub fn with_hooks(mut self, hooks: impl State<C> + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub(crate) fn set_hooks(&mut self, hooks: Box<dyn State<C>>) {
        self.hooks = Some(hooks);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Register `state` under its short type name.
    pub fn add_state<S>(&mut self, state: S) -> Result<StateId, ConfigError>
    where
        S: State<C> + 'static,
    {
        self.add_named_state(default_state_name::<S>(), state)
    }

    /// Register `state` under `name`.
    ///
    /// Fails with [`ConfigError::DuplicateState`] if the name is taken; the
    /// table is unchanged in that case. The state is not woken until the
    /// machine first enters it.
    pub fn add_named_state<S>(
        &mut self,
        name: impl Into<String>,
        state: S,
    ) -> Result<StateId, ConfigError>
    where
        S: State<C> + 'static,
    {
        self.insert_state(name.into(), std::any::type_name::<S>(), Box::new(state))
    }

    pub(crate) fn insert_state(
        &mut self,
        name: String,
        type_name: &'static str,
        state: Box<dyn State<C>>,
    ) -> Result<StateId, ConfigError> {
        let id = self
            .registry
            .insert(name.clone(), type_name)
            .ok_or(ConfigError::DuplicateState { name })?;
        self.slots.push(Slot {
            lifecycle: Lifecycle::new(),
            state,
        });
        Ok(id)
    }

    /// Add an edge between two registered states.
    ///
    /// Fails with [`ConfigError::UnknownState`] if either end is not
    /// registered, and with [`ConfigError::DuplicateTransition`] if the
    /// source already has an edge with the same name or the same
    /// destination.
    pub fn add_transition(&mut self, edge: TransitionEdge<C>) -> Result<(), ConfigError> {
        let from = self.resolve(edge.from())?;
        let to = self.resolve(edge.to())?;

        if self.transitions.conflicts(from, edge.name(), to) {
            return Err(ConfigError::DuplicateTransition {
                from: edge.from().to_string(),
                to: edge.to().to_string(),
                name: edge.name().to_string(),
            });
        }

        self.transitions.insert(from, to, edge);
        Ok(())
    }

    /// Choose the child adopted when the machine is entered.
    ///
    /// May be called once. Nothing is activated until the machine's own
    /// first enter.
    pub fn set_initial_state(&mut self, name: &str) -> Result<(), ConfigError> {
        if let Some(current) = self.starting {
            return Err(ConfigError::AlreadyInitialized {
                current: self.registry.name_of(current).to_string(),
            });
        }
        self.starting = Some(self.resolve(name)?);
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<StateId, ConfigError> {
        self.registry
            .lookup(name)
            .ok_or_else(|| ConfigError::UnknownState {
                name: name.to_string(),
            })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn transitions(&self) -> &TransitionTable<C> {
        &self.transitions
    }

    /// The active child, if any.
    pub fn current_state(&self) -> Option<&StateIdentity> {
        self.current.and_then(|id| self.registry.identity(id))
    }

    pub fn starting_state(&self) -> Option<&StateIdentity> {
        self.starting.and_then(|id| self.registry.identity(id))
    }

    /// Whether a transition is waiting for the next update.
    pub fn has_pending_transition(&self) -> bool {
        self.signals.pending.is_some()
    }

    /// Lifecycle flags of the child called `name`.
    pub fn lifecycle_of(&self, name: &str) -> Option<Lifecycle> {
        self.registry
            .lookup(name)
            .map(|id| self.slots[id.index()].lifecycle)
    }

    /// Run `f` on the child `id` with a scope for this machine's children.
    fn with_child<R>(
        &mut self,
        scope: &mut Scope<'_, C>,
        id: StateId,
        active: Option<StateId>,
        f: impl FnOnce(&mut Slot<C>, &mut Scope<'_, C>) -> R,
    ) -> R {
        let Self {
            label,
            registry,
            slots,
            transitions,
            signals,
            ..
        } = self;
        let slot = &mut slots[id.index()];
        let mut child = scope.nested(label, registry, transitions, signals, active);
        f(slot, &mut child)
    }

    fn enter_child(&mut self, scope: &mut Scope<'_, C>, id: StateId) {
        let entered = self.with_child(scope, id, Some(id), |slot, child| {
            slot.lifecycle.enter(slot.state.as_mut(), child)
        });
        if entered {
            let name = self.registry.name_of(id);
            tracing::trace!(machine = %self.label, state = name, "state entered");
            if let Some(observer) = scope.observer() {
                observer.state_entered(&self.label, name, scope.tick());
            }
        }
    }

    fn exit_child(&mut self, scope: &mut Scope<'_, C>, id: StateId) {
        self.deactivate_child(scope, id, None);
    }

    /// Deactivate the child `id`, which still counts as the active state
    /// while its exit runs when `active` is `Some(id)`.
    fn deactivate_child(
        &mut self,
        scope: &mut Scope<'_, C>,
        id: StateId,
        active: Option<StateId>,
    ) {
        let exited = self.with_child(scope, id, active, |slot, child| {
            slot.lifecycle.exit(slot.state.as_mut(), child)
        });
        if exited {
            let name = self.registry.name_of(id);
            tracing::trace!(machine = %self.label, state = name, "state exited");
            if let Some(observer) = scope.observer() {
                observer.state_exited(&self.label, name, scope.tick());
            }
        }
    }

    fn update_child(&mut self, scope: &mut Scope<'_, C>, id: StateId, elapsed_ms: u64) {
        self.with_child(scope, id, Some(id), |slot, child| {
            slot.lifecycle.update(slot.state.as_mut(), child, elapsed_ms)
        });
    }

    /// Realize `pending`: exit the old child, enter the new one, then run
    /// the edge callback.
    fn commit(&mut self, scope: &mut Scope<'_, C>, pending: PendingEdge) {
        let Some(edge) = self.transitions.edge(pending) else {
            return;
        };
        let to = edge.to;
        let name = edge.declared.name().to_string();

        if self.current == Some(to) {
            tracing::trace!(
                machine = %self.label,
                transition = %name,
                state = self.registry.name_of(to),
                "self-transition suppressed"
            );
            return;
        }

        let from = self.current.take();
        if let Some(previous) = from {
            self.exit_child(scope, previous);
        }
        self.current = Some(to);
        self.enter_child(scope, to);

        if let Some(edge) = self.transitions.edge_mut(pending) {
            edge.declared.fire(scope.context_mut());
        }

        let from_name = from.map_or("<none>", |id| self.registry.name_of(id));
        let to_name = self.registry.name_of(to);
        tracing::debug!(
            machine = %self.label,
            transition = %name,
            from = from_name,
            to = to_name,
            tick = scope.tick(),
            "transition committed"
        );

        if let Some(observer) = scope.observer() {
            observer.transition_committed(&TransitionRecord {
                machine: self.label.clone(),
                transition: name,
                from: from_name.to_string(),
                to: to_name.to_string(),
                tick: scope.tick(),
                timestamp: Utc::now(),
            });
        }
    }

    /// Act on requests children left during the last call.
    ///
    /// A child machine that released itself is exited as the active state,
    /// so its exit hook can request the edge that leads away from it.
    fn settle(&mut self, scope: &mut Scope<'_, C>) {
        if std::mem::take(&mut self.signals.release_requested) {
            if let Some(id) = self.current {
                self.deactivate_child(scope, id, Some(id));
            }
        }
        if std::mem::take(&mut self.signals.exit_requested) {
            scope.request_release();
        }
    }
}

impl<C> State<C> for StateMachine<C> {
    fn on_wake(&mut self, scope: &mut Scope<'_, C>) {
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_wake(scope);
        }
    }

    fn on_enter(&mut self, scope: &mut Scope<'_, C>) {
        if self.current.is_none() {
            self.current = self.starting;
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_enter(scope);
        }
        if let Some(id) = self.current {
            self.enter_child(scope, id);
        }
        self.settle(scope);
    }

    fn on_update(&mut self, scope: &mut Scope<'_, C>, elapsed_ms: u64) {
        if let Some(pending) = self.signals.pending.take() {
            self.commit(scope, pending);
        } else {
            if let Some(id) = self.current {
                self.update_child(scope, id, elapsed_ms);
            }
            if let Some(hooks) = self.hooks.as_mut() {
                hooks.on_update(scope, elapsed_ms);
            }
        }
        self.settle(scope);
    }

    fn on_exit(&mut self, scope: &mut Scope<'_, C>) {
        if let Some(id) = self.current {
            self.exit_child(scope, id);
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_exit(scope);
        }
        self.current = None;
        self.signals.clear();
    }

    fn inspect(&self) -> Option<&dyn Inspect> {
        Some(self)
    }
}

impl<C> Inspect for StateMachine<C> {
    fn label(&self) -> &str {
        &self.label
    }

    fn state_names(&self) -> Vec<&str> {
        self.registry.iter().map(StateIdentity::name).collect()
    }

    fn state(&self, name: &str) -> Option<(&StateIdentity, Lifecycle)> {
        let identity = self.registry.by_name(name)?;
        Some((identity, self.slots[identity.id().index()].lifecycle))
    }

    fn current_state(&self) -> Option<&StateIdentity> {
        StateMachine::current_state(self)
    }

    fn starting_state(&self) -> Option<&StateIdentity> {
        StateMachine::starting_state(self)
    }

    fn pending_transition(&self) -> Option<EdgeRef<'_>> {
        let edge = self.transitions.edge(self.signals.pending?)?;
        Some(EdgeRef {
            from: edge.declared.from(),
            to: edge.declared.to(),
            name: edge.declared.name(),
        })
    }

    fn transitions_from(&self, from: &str) -> Vec<EdgeRef<'_>> {
        let Some(id) = self.registry.lookup(from) else {
            return Vec::new();
        };
        self.transitions
            .outgoing(id)
            .map(|edge| EdgeRef {
                from: edge.from(),
                to: edge.to(),
                name: edge.name(),
            })
            .collect()
    }

    fn child(&self, name: &str) -> Option<&dyn Inspect> {
        let id = self.registry.lookup(name)?;
        self.slots[id.index()].state.inspect()
    }
}

impl<C> fmt::Debug for StateMachine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("label", &self.label)
            .field("states", &self.state_names())
            .field("transitions", &self.transitions.len())
            .field("starting", &self.starting_state().map(StateIdentity::name))
            .field("current", &self.current_state().map(StateIdentity::name))
            .field("pending", &self.signals.pending.is_some())
            .finish()
    }
}
