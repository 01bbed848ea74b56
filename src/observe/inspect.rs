//! Read-only inspection of a machine's tables.

use crate::core::{Lifecycle, StateIdentity};
use serde::Serialize;

/// One outgoing edge as seen by an inspector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeRef<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub name: &'a str,
}

/// Everything a visualizer may read from a machine.
///
/// Implementations never mutate the machine. Nested machines are reached
/// through [`child`](Inspect::child).
pub trait Inspect {
    /// Label given to the machine at construction.
    fn label(&self) -> &str;

    /// Registered state names, in registration order.
    fn state_names(&self) -> Vec<&str>;

    /// Identity and lifecycle flags of the state called `name`.
    fn state(&self, name: &str) -> Option<(&StateIdentity, Lifecycle)>;

    /// The active child, if any.
    fn current_state(&self) -> Option<&StateIdentity>;

    /// The child adopted when the machine is entered, if configured.
    fn starting_state(&self) -> Option<&StateIdentity>;

    /// The edge waiting to be committed on the next update, if any.
    fn pending_transition(&self) -> Option<EdgeRef<'_>>;

    /// Outgoing edges of the state called `from`, in declaration order.
    fn transitions_from(&self, from: &str) -> Vec<EdgeRef<'_>>;

    /// Inspection view of a child that is itself a machine.
    fn child(&self, name: &str) -> Option<&dyn Inspect>;
}
