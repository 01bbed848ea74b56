//! Configuration errors for machines and the machine builder.

use thiserror::Error;

/// Errors raised by the configuration calls of a machine.
///
/// These are programmer errors: they surface at the offending call and the
/// machine's tables are left exactly as they were before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("State '{name}' is already registered")]
    DuplicateState { name: String },

    #[error("State '{name}' is not registered. Add the state before referencing it")]
    UnknownState { name: String },

    #[error("Transition '{name}' from '{from}' to '{to}' conflicts with an existing edge")]
    DuplicateTransition {
        from: String,
        to: String,
        name: String,
    },

    #[error("Initial state already set to '{current}'")]
    AlreadyInitialized { current: String },
}

/// Every configuration error found while building one machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("machine '{label}' has {} configuration error(s): {}", .errors.len(), summary(.errors))]
pub struct BuildErrors {
    label: String,
    errors: Vec<ConfigError>,
}

impl BuildErrors {
    pub(crate) fn new(label: String, errors: Vec<ConfigError>) -> Self {
        Self { label, errors }
    }

    /// Label of the machine that failed to build.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The errors, in configuration order.
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ConfigError> {
        self.errors
    }
}

fn summary(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
