//! Identity of registered states.
//!
//! A machine stores its children in an arena and hands out [`StateId`]
//! handles. Identities compare by name, declared type and handle, never by
//! the address of the hosted value.

use std::fmt;

/// Opaque handle to a state registered in one machine.
///
/// Handles are only meaningful for the machine that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name, declared type and handle of a registered state.
///
/// Created once at registration and owned by the machine for its whole
/// lifetime. "No state selected" is expressed as `Option::<StateIdentity>::None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateIdentity {
    id: StateId,
    name: String,
    type_name: &'static str,
}

impl StateIdentity {
    pub(crate) fn new(id: StateId, name: String, type_name: &'static str) -> Self {
        Self {
            id,
            name,
            type_name,
        }
    }

    /// Arena handle of the state.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Registration name, unique within the owning machine.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified Rust type of the hosted state.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for StateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Default registration name for a state type: the last path segment of the
/// type name with generic parameters stripped.
///
/// ```rust
/// use tickstate::core::default_state_name;
///
/// struct Green;
/// assert_eq!(default_state_name::<Green>(), "Green");
/// assert_eq!(default_state_name::<Vec<u8>>(), "Vec");
/// ```
pub fn default_state_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
