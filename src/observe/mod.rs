//! Observation of running machines.
//!
//! Nothing here is global: an observer is handed to the
//! [`Driver`](crate::Driver) and travels down the tree with every call, and
//! inspection reads a machine through the [`Inspect`] trait without mutating
//! it.
//!
//! - [`MachineObserver`]: callbacks for lifecycle and transition events
//! - [`TransitionLog`]: an observer that keeps the committed transitions
//! - [`Inspect`]: the read-only table view a visualizer relies on
//! - [`Snapshot`]: a serializable capture of a whole tree

pub mod error;
mod inspect;
mod log;
mod snapshot;

pub use error::SnapshotError;
pub use inspect::{EdgeRef, Inspect};
pub use log::{TransitionLog, TransitionRecord};
pub use snapshot::{EdgeView, MachineView, Snapshot, StateView, SNAPSHOT_VERSION};

/// Receives events from every machine in a driven tree.
///
/// Methods take `&self`; observers that record use interior mutability.
/// All methods default to doing nothing.
pub trait MachineObserver {
    /// `state` became the active child of `machine`.
    fn state_entered(&self, _machine: &str, _state: &str, _tick: u64) {}

    /// `state` stopped being the active child of `machine`.
    fn state_exited(&self, _machine: &str, _state: &str, _tick: u64) {}

    /// A pending transition was committed.
    fn transition_committed(&self, _record: &TransitionRecord) {}
}
