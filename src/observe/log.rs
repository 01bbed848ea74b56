//! Transition log observer.
//!
//! Keeps an ordered record of every committed transition in a tree, with
//! wall-clock timestamps next to the tick numbers.

use super::MachineObserver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use tickstate::observe::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     machine: "signal".to_string(),
///     transition: "__next__".to_string(),
///     from: "Green".to_string(),
///     to: "Yellow".to_string(),
///     tick: 6,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "Yellow");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Label of the machine that committed the transition
    pub machine: String,
    /// Name of the committed edge
    pub transition: String,
    /// The state being transitioned from
    pub from: String,
    /// The state being transitioned to
    pub to: String,
    /// Driver tick in which the commit happened
    pub tick: u64,
    /// When the commit happened
    pub timestamp: DateTime<Utc>,
}

/// Observer that records committed transitions in order.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use tickstate::observe::TransitionLog;
///
/// let log = Rc::new(TransitionLog::new());
/// assert!(log.is_empty());
/// // driver.with_observer(log.clone()) ...
/// ```
#[derive(Debug, Default)]
pub struct TransitionLog {
    records: RefCell<Vec<TransitionRecord>>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded transitions, oldest first.
    pub fn records(&self) -> Vec<TransitionRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// The states `machine` passed through: the source of its first
    /// recorded transition, then the destination of each transition.
    pub fn path(&self, machine: &str) -> Vec<String> {
        let records = self.records.borrow();
        let mut transitions = records.iter().filter(|r| r.machine == machine).peekable();
        let mut path = Vec::new();
        if let Some(first) = transitions.peek() {
            path.push(first.from.clone());
        }
        path.extend(transitions.map(|r| r.to.clone()));
        path
    }

    /// Wall-clock time between the first and last recorded transition.
    ///
    /// Returns `None` if nothing was recorded.
    pub fn duration(&self) -> Option<Duration> {
        let records = self.records.borrow();
        let (first, last) = (records.first()?, records.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl MachineObserver for TransitionLog {
    fn transition_committed(&self, record: &TransitionRecord) {
        self.records.borrow_mut().push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(machine: &str, from: &str, to: &str, tick: u64) -> TransitionRecord {
        TransitionRecord {
            machine: machine.to_string(),
            transition: "__next__".to_string(),
            from: from.to_string(),
            to: to.to_string(),
            tick,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_log_is_empty() {
        let log = TransitionLog::new();
        assert!(log.is_empty());
        assert!(log.path("signal").is_empty());
        assert!(log.duration().is_none());
    }

    #[test]
    fn path_follows_one_machine() {
        let log = TransitionLog::new();
        log.transition_committed(&record("signal", "Green", "Yellow", 6));
        log.transition_committed(&record("crossing", "Idle", "Walk", 7));
        log.transition_committed(&record("signal", "Yellow", "Red", 9));

        assert_eq!(log.path("signal"), vec!["Green", "Yellow", "Red"]);
        assert_eq!(log.path("crossing"), vec!["Idle", "Walk"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let log = TransitionLog::new();
        log.transition_committed(&record("signal", "Green", "Yellow", 1));
        assert_eq!(log.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn duration_spans_first_to_last() {
        let log = TransitionLog::new();
        let start = Utc::now();
        let mut first = record("signal", "Green", "Yellow", 1);
        first.timestamp = start;
        let mut second = record("signal", "Yellow", "Red", 2);
        second.timestamp = start + chrono::Duration::milliseconds(250);
        log.transition_committed(&first);
        log.transition_committed(&second);

        assert_eq!(log.duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn records_serialize_correctly() {
        let log = TransitionLog::new();
        log.transition_committed(&record("signal", "Green", "Yellow", 6));

        let json = serde_json::to_string(&log.records()).unwrap();
        let decoded: Vec<TransitionRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, log.records());
    }

    #[test]
    fn clear_drops_records() {
        let log = TransitionLog::new();
        log.transition_committed(&record("signal", "Green", "Yellow", 6));
        log.clear();
        assert!(log.is_empty());
    }
}
