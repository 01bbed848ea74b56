//! Built-in state that leaves its machine.

use crate::core::{Scope, State};

/// Entering this state deactivates the machine that owns it.
///
/// The machine's holder performs the exit once the current call returns:
/// children exit bottom-up and the machine's own exit hook runs. Inside a
/// parent that hook still runs as the parent's active state, so it can
/// request the parent's next edge, which commits on the parent's next
/// update. At the root, the [`Driver`](crate::Driver) reports
/// [`is_finished`](crate::Driver::is_finished).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitState;

impl<C> State<C> for ExitState {
    fn on_enter(&mut self, scope: &mut Scope<'_, C>) {
        scope.exit_machine();
    }
}
