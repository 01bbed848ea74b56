//! Root driver: owns the top machine and feeds it ticks.

use crate::core::scope::Signals;
use crate::core::{Lifecycle, Scope};
use crate::machine::StateMachine;
use crate::observe::{MachineObserver, Snapshot};
use std::rc::Rc;

/// Owns the top-level machine and the shared context, and drives both.
///
/// The driver applies the lifecycle contract to the root machine: entering
/// twice is the same as entering once, updates reach the machine only while
/// it is active, and shutdown exits it exactly once. Dropping the driver
/// shuts it down.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{Scope, State};
/// use tickstate::{Driver, ExitState, MachineBuilder};
/// use tickstate::core::TransitionEdge;
///
/// struct Work;
/// impl State<Vec<u64>> for Work {
///     fn on_update(&mut self, scope: &mut Scope<'_, Vec<u64>>, elapsed_ms: u64) {
///         scope.context_mut().push(elapsed_ms);
///         if scope.context().len() == 3 {
///             scope.next();
///         }
///     }
/// }
///
/// let machine = MachineBuilder::new("job")
///     .state(Work)
///     .state(ExitState)
///     .transition(TransitionEdge::new("Work", "ExitState"))
///     .initial("Work")
///     .build()
///     .unwrap();
///
/// let mut driver = Driver::new(machine, Vec::new());
/// while !driver.is_finished() {
///     driver.tick(10);
/// }
/// assert_eq!(driver.context(), &vec![10, 10, 10]);
/// ```
pub struct Driver<C> {
    context: C,
    machine: StateMachine<C>,
    lifecycle: Lifecycle,
    signals: Signals,
    observer: Option<Rc<dyn MachineObserver>>,
    ticks: u64,
    elapsed_ms: u64,
    shut_down: bool,
}

impl<C> Driver<C> {
    pub fn new(machine: StateMachine<C>, context: C) -> Self {
        Self {
            context,
            machine,
            lifecycle: Lifecycle::new(),
            signals: Signals::default(),
            observer: None,
            ticks: 0,
            elapsed_ms: 0,
            shut_down: false,
        }
    }

    /// Report events from every machine in the tree to `observer`.
    pub fn with_observer(mut self, observer: Rc<dyn MachineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Activate the root machine.
    ///
    /// Returns `false` if it was already active or the driver is shut down.
    pub fn enter(&mut self) -> bool {
        if self.shut_down {
            return false;
        }
        let entered = self.drive(|lifecycle, machine, scope| lifecycle.enter(machine, scope));
        if entered {
            tracing::debug!(machine = %self.machine.label(), "machine started");
        }
        entered
    }

    /// Feed one tick of `elapsed_ms` to the root machine.
    ///
    /// Silently does nothing while the machine is inactive.
    pub fn update(&mut self, elapsed_ms: u64) {
        if self.shut_down || !self.lifecycle.is_active() {
            return;
        }
        self.ticks = self.ticks.saturating_add(1);
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        self.drive(|lifecycle, machine, scope| lifecycle.update(machine, scope, elapsed_ms));
    }

    /// Drive the machine the way a game loop does: the first tick enters
    /// it, every later tick updates it.
    ///
    /// A machine that deactivated itself is not entered again, so it stays
    /// [`is_finished`](Self::is_finished) and later ticks do nothing. Call
    /// [`enter`](Self::enter) to restart it explicitly.
    pub fn tick(&mut self, elapsed_ms: u64) {
        if self.lifecycle.is_awoken() {
            self.update(elapsed_ms);
        } else {
            self.enter();
        }
    }

    /// Deactivate the root machine. It may be entered again later.
    ///
    /// Returns `false` if it was not active.
    pub fn exit(&mut self) -> bool {
        let exited = self.drive(|lifecycle, machine, scope| lifecycle.exit(machine, scope));
        if exited {
            tracing::debug!(machine = %self.machine.label(), "machine stopped");
        }
        exited
    }

    /// Exit the root machine for good. Later calls to any driving method,
    /// including this one, do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.exit();
        self.shut_down = true;
        tracing::debug!(
            machine = %self.machine.label(),
            ticks = self.ticks,
            elapsed_ms = self.elapsed_ms,
            "driver shut down"
        );
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    /// Whether the machine ran and is no longer active, because it exited
    /// itself or was stopped.
    pub fn is_finished(&self) -> bool {
        self.lifecycle.is_awoken() && !self.lifecycle.is_active()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Number of updates delivered to the machine.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Total elapsed milliseconds delivered to the machine.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Read-only access to the root machine.
    pub fn machine(&self) -> &StateMachine<C> {
        &self.machine
    }

    /// Capture the whole tree.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.machine,
            self.ticks,
            self.elapsed_ms,
            self.lifecycle.is_active(),
        )
    }

    /// Run `f` against the root with a root scope, then honor a request from
    /// the machine to be deactivated.
    fn drive<R>(
        &mut self,
        f: impl FnOnce(&mut Lifecycle, &mut StateMachine<C>, &mut Scope<'_, C>) -> R,
    ) -> R {
        let Self {
            context,
            machine,
            lifecycle,
            signals,
            observer,
            ticks,
            ..
        } = self;

        let result = {
            let mut scope =
                Scope::root(&mut *context, observer.as_deref(), *ticks, &mut *signals);
            f(&mut *lifecycle, &mut *machine, &mut scope)
        };

        let released = std::mem::take(&mut signals.release_requested);
        let exit_requested = std::mem::take(&mut signals.exit_requested);
        if released || exit_requested {
            let mut scope = Scope::root(&mut *context, observer.as_deref(), *ticks, &mut *signals);
            if lifecycle.exit(&mut *machine, &mut scope) {
                tracing::debug!(machine = %machine.label(), "machine finished");
            }
        }
        result
    }
}

impl<C> Drop for Driver<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
