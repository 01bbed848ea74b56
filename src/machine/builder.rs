//! Builder for configuring machines.

use super::error::{BuildErrors, ConfigError};
use super::StateMachine;
use crate::core::{default_state_name, State, TransitionEdge};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

enum Step<C> {
    State {
        name: String,
        type_name: &'static str,
        state: Box<dyn State<C>>,
    },
    Transition(TransitionEdge<C>),
    Initial(String),
}

/// Builder for constructing machines with a fluent API.
///
/// Steps are applied in the order they were given. Unlike the direct
/// configuration calls, `build` does not stop at the first mistake: it
/// reports every configuration error of the machine at once, and returns no
/// machine at all if there was any.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{State, TransitionEdge};
/// use tickstate::machine::ConfigError;
/// use tickstate::MachineBuilder;
///
/// struct Green;
/// impl State<()> for Green {}
/// struct Yellow;
/// impl State<()> for Yellow {}
///
/// let machine = MachineBuilder::new("signal")
///     .state(Green)
///     .state(Yellow)
///     .transition(TransitionEdge::new("Green", "Yellow"))
///     .initial("Green")
///     .build()
///     .unwrap();
/// assert_eq!(machine.starting_state().unwrap().name(), "Green");
///
/// let broken = MachineBuilder::<()>::new("signal")
///     .state(Green)
///     .state(Green)
///     .transition(TransitionEdge::new("Green", "Red"))
///     .build()
///     .unwrap_err();
/// assert_eq!(broken.errors().len(), 2);
/// assert!(matches!(broken.errors()[0], ConfigError::DuplicateState { .. }));
/// ```
pub struct MachineBuilder<C> {
    label: String,
    hooks: Option<Box<dyn State<C>>>,
    steps: Vec<Step<C>>,
}

impl<C> MachineBuilder<C> {
    /// Create a new builder for a machine called `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hooks: None,
            steps: Vec::new(),
        }
    }

    /// Set the machine's own hooks.
    pub fn hooks(mut self, hooks: impl State<C> + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Register a state under its short type name.
    pub fn state<S>(self, state: S) -> Self
    where
        S: State<C> + 'static,
    {
        self.named_state(default_state_name::<S>(), state)
    }

    /// Register a state under `name`.
    pub fn named_state<S>(mut self, name: impl Into<String>, state: S) -> Self
    where
        S: State<C> + 'static,
    {
        self.steps.push(Step::State {
            name: name.into(),
            type_name: std::any::type_name::<S>(),
            state: Box::new(state),
        });
        self
    }

    /// Add an edge.
    pub fn transition(mut self, edge: TransitionEdge<C>) -> Self {
        self.steps.push(Step::Transition(edge));
        self
    }

    /// Add several edges at once.
    pub fn transitions(mut self, edges: impl IntoIterator<Item = TransitionEdge<C>>) -> Self {
        self.steps.extend(edges.into_iter().map(Step::Transition));
        self
    }

    /// Set the initial state.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Initial(name.into()));
        self
    }

    /// Build the machine.
    ///
    /// Returns every configuration error if any step failed.
    pub fn build(self) -> Result<StateMachine<C>, BuildErrors> {
        let mut machine = StateMachine::new(self.label);
        if let Some(hooks) = self.hooks {
            machine.set_hooks(hooks);
        }

        let checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = self
            .steps
            .into_iter()
            .map(|step| match apply(&mut machine, step) {
                Ok(()) => Validation::success(()),
                Err(error) => Validation::fail(error),
            })
            .collect();

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(()) => Ok(machine),
            Validation::Failure(errors) => {
                let errors: Vec<ConfigError> = errors.iter().cloned().collect();
                tracing::debug!(
                    machine = %machine.label(),
                    errors = errors.len(),
                    "machine configuration rejected"
                );
                Err(BuildErrors::new(machine.label().to_string(), errors))
            }
        }
    }
}

fn apply<C>(machine: &mut StateMachine<C>, step: Step<C>) -> Result<(), ConfigError> {
    match step {
        Step::State {
            name,
            type_name,
            state,
        } => machine.insert_state(name, type_name, state).map(|_| ()),
        Step::Transition(edge) => machine.add_transition(edge),
        Step::Initial(name) => machine.set_initial_state(&name),
    }
}
