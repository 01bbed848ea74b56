//! Tickstate: a tick-driven hierarchical state machine runtime
//!
//! States are composed into trees. Each machine drives exactly one active
//! child, moves between children only along named, optionally guarded edges,
//! and commits at most one transition per tick. A machine is itself a state,
//! so machines nest to any depth.
//!
//! # Core Concepts
//!
//! - **State**: behavior hooks (`on_wake`, `on_enter`, `on_update`,
//!   `on_exit`) via the `State` trait
//! - **Lifecycle**: wake once, idempotent enter and exit
//! - **Edges**: named transitions between sibling states, with optional
//!   guards and commit callbacks
//! - **StateMachine**: the composite state that owns the tables
//! - **Driver**: the root that feeds elapsed time to the tree
//!
//! # Example
//!
//! ```rust
//! use tickstate::core::{Scope, State, TransitionEdge};
//! use tickstate::{Driver, MachineBuilder};
//!
//! #[derive(Default)]
//! struct Signal {
//!     color: &'static str,
//! }
//!
//! struct Light {
//!     color: &'static str,
//!     duration_ms: i64,
//!     remaining_ms: i64,
//! }
//!
//! impl Light {
//!     fn new(color: &'static str, duration_ms: i64) -> Self {
//!         Self { color, duration_ms, remaining_ms: 0 }
//!     }
//! }
//!
//! impl State<Signal> for Light {
//!     fn on_enter(&mut self, scope: &mut Scope<'_, Signal>) {
//!         self.remaining_ms = self.duration_ms;
//!         scope.context_mut().color = self.color;
//!     }
//!
//!     fn on_update(&mut self, scope: &mut Scope<'_, Signal>, elapsed_ms: u64) {
//!         self.remaining_ms -= elapsed_ms as i64;
//!         if self.remaining_ms <= 0 {
//!             scope.next();
//!         }
//!     }
//! }
//!
//! let machine = MachineBuilder::new("signal")
//!     .named_state("Green", Light::new("green", 5000))
//!     .named_state("Yellow", Light::new("yellow", 2000))
//!     .named_state("Red", Light::new("red", 1500))
//!     .transitions([
//!         TransitionEdge::new("Green", "Yellow"),
//!         TransitionEdge::new("Yellow", "Red"),
//!         TransitionEdge::new("Red", "Green"),
//!     ])
//!     .initial("Green")
//!     .build()
//!     .unwrap();
//!
//! let mut driver = Driver::new(machine, Signal::default());
//! driver.enter();
//! for _ in 0..5 {
//!     driver.update(1000);
//! }
//! assert_eq!(driver.context().color, "green");
//! driver.update(1000);
//! assert_eq!(driver.context().color, "yellow");
//! ```

pub mod core;
pub mod driver;
pub mod machine;
pub mod observe;

// Re-export commonly used types
pub use core::{Guard, Scope, State, TransitionEdge};
pub use driver::Driver;
pub use machine::{ConfigError, ExitState, MachineBuilder, StateMachine};
pub use observe::{MachineObserver, Snapshot, TransitionLog};
