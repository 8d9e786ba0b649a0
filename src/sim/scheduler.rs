//! Cancellable timer queue driven by the frame clock
//!
//! Delayed work (completion delay, fade phases) is queued as plain values and
//! handed back from `advance` once due. Nothing runs on its own, so a reset
//! can drop everything still pending.

use serde::{Deserialize, Serialize};

/// Handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    due: f64,
    task: T,
}

/// Timer queue with its own monotonic clock (seconds)
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    /// Sorted by (due, id)
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Current clock time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of tasks still waiting
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Queue `task` to come due `delay` seconds from now
    pub fn schedule(&mut self, delay: f64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay.max(0.0);

        // Insert after every entry due at or before this one (FIFO on ties)
        let idx = self.entries.partition_point(|e| e.due <= due);
        self.entries.insert(idx, Entry { id, due, task });
        id
    }

    /// Drop a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move the clock forward and return every task now due, in order
    pub fn advance(&mut self, dt: f64) -> Vec<T> {
        self.now += dt.max(0.0);
        let due = self.entries.partition_point(|e| e.due <= self.now);
        self.entries.drain(..due).map(|e| e.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_when_due() {
        let mut sched = Scheduler::new();
        sched.schedule(1.0, "a");
        assert!(sched.advance(0.5).is_empty());
        assert_eq!(sched.advance(0.5), vec!["a"]);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_due_order_and_ties() {
        let mut sched = Scheduler::new();
        sched.schedule(2.0, "late");
        sched.schedule(1.0, "first");
        sched.schedule(1.0, "second");
        assert_eq!(sched.advance(5.0), vec!["first", "second", "late"]);
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();
        let id = sched.schedule(1.0, 1);
        sched.schedule(1.0, 2);
        assert!(sched.is_scheduled(id));
        assert!(sched.cancel(id));
        assert!(!sched.cancel(id));
        assert_eq!(sched.advance(1.0), vec![2]);
    }

    #[test]
    fn test_clear_and_relative_delay() {
        let mut sched = Scheduler::new();
        sched.schedule(1.0, 1);
        sched.clear();
        assert!(sched.advance(10.0).is_empty());

        // Delays are relative to the current clock
        sched.schedule(1.0, 2);
        assert!(sched.advance(0.75).is_empty());
        assert_eq!(sched.advance(0.25), vec![2]);
        assert!((sched.now() - 11.0).abs() < 1e-9);
    }
}
