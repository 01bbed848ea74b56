//! Guard predicates for transition edges.
//!
//! Guards are pure boolean functions over the shared context. An edge with a
//! guard can only be selected while the guard returns `true`.

use std::fmt;

/// Pure predicate that decides whether an edge may be taken.
///
/// Guards are evaluated when a transition is requested, against the context
/// as it is at that moment. A guard that says no makes the request return
/// `false`; it is never an error.
///
/// # Example
///
/// ```rust
/// use tickstate::core::Guard;
///
/// struct Battle {
///     enemy_hp: i32,
/// }
///
/// let enemy_defeated = Guard::new(|battle: &Battle| battle.enemy_hp <= 0);
///
/// assert!(!enemy_defeated.check(&Battle { enemy_hp: 12 }));
/// assert!(enemy_defeated.check(&Battle { enemy_hp: 0 }));
/// ```
pub struct Guard<C> {
    predicate: Box<dyn Fn(&C) -> bool>,
}

impl<C> Guard<C> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects; it may
    /// run any number of times per tick.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this context.
    pub fn check(&self, context: &C) -> bool {
        (self.predicate)(context)
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
