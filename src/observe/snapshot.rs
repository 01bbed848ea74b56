//! Serializable capture of a machine tree.
//!
//! A snapshot is a view for tools, not a checkpoint: it records names,
//! flags and edges, never the hosted states themselves, and cannot be
//! turned back into a running machine.

use super::error::SnapshotError;
use super::inspect::{EdgeRef, Inspect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// One edge in a [`MachineView`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    pub from: String,
    pub to: String,
    pub name: String,
}

impl From<EdgeRef<'_>> for EdgeView {
    fn from(edge: EdgeRef<'_>) -> Self {
        Self {
            from: edge.from.to_string(),
            to: edge.to.to_string(),
            name: edge.name.to_string(),
        }
    }
}

/// One registered state in a [`MachineView`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    pub name: String,
    pub type_name: String,
    pub awoken: bool,
    pub active: bool,
    /// Present when the state is itself a machine.
    pub machine: Option<Box<MachineView>>,
}

/// Tables and position of one machine, with nested machines inlined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineView {
    pub label: String,
    pub states: Vec<StateView>,
    pub starting: Option<String>,
    pub current: Option<String>,
    pub pending: Option<EdgeView>,
    pub transitions: Vec<EdgeView>,
}

impl MachineView {
    /// Capture `machine` and every nested machine below it.
    pub fn capture(machine: &dyn Inspect) -> Self {
        let names = machine.state_names();

        let states = names
            .iter()
            .filter_map(|name| {
                let (identity, lifecycle) = machine.state(name)?;
                Some(StateView {
                    name: identity.name().to_string(),
                    type_name: identity.type_name().to_string(),
                    awoken: lifecycle.is_awoken(),
                    active: lifecycle.is_active(),
                    machine: machine
                        .child(name)
                        .map(|child| Box::new(MachineView::capture(child))),
                })
            })
            .collect();

        let transitions = names
            .iter()
            .flat_map(|name| machine.transitions_from(name))
            .map(EdgeView::from)
            .collect();

        Self {
            label: machine.label().to_string(),
            states,
            starting: machine.starting_state().map(|s| s.name().to_string()),
            current: machine.current_state().map(|s| s.name().to_string()),
            pending: machine.pending_transition().map(EdgeView::from),
            transitions,
        }
    }

    /// Names of the active states from this machine down to the deepest
    /// active leaf.
    pub fn active_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut view = self;
        while let Some(current) = view.current.as_deref() {
            path.push(current);
            match view
                .states
                .iter()
                .find(|s| s.name == current)
                .and_then(|s| s.machine.as_deref())
            {
                Some(child) => view = child,
                None => break,
            }
        }
        path
    }
}

/// Serializable capture of a driven tree at one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Driver tick at capture time
    pub tick: u64,

    /// Total elapsed milliseconds fed to the tree
    pub elapsed_ms: u64,

    /// Whether the root machine was active
    pub active: bool,

    /// The root machine
    pub root: MachineView,
}

impl Snapshot {
    pub(crate) fn capture(root: &dyn Inspect, tick: u64, elapsed_ms: u64, active: bool) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            tick,
            elapsed_ms,
            active,
            root: MachineView::capture(root),
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode a snapshot, rejecting formats this version cannot read.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}
