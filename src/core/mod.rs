//! Core state and transition types.
//!
//! This module contains the building blocks every machine is made of:
//! - The `State` trait and the `Lifecycle` flags that enforce its contract
//! - Arena handles and identities for registered states
//! - Guarded, named transition edges and the per-machine edge table
//! - The `Scope` a running state uses to reach its owning machine

mod guard;
mod identity;
mod registry;
pub(crate) mod scope;
mod state;
mod transition;

pub use guard::Guard;
pub use identity::{default_state_name, StateId, StateIdentity};
pub use registry::Registry;
pub use scope::Scope;
pub use state::{Lifecycle, State};
pub(crate) use transition::PendingEdge;
pub use transition::{
    TransitionCallback, TransitionEdge, TransitionRejected, TransitionRequest, TransitionTable,
    DEFAULT_TRANSITION,
};
