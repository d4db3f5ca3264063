//! Timeline of delayed continuations.
//!
//! Every "do this when the animation finishes" step of a level is queued here
//! with a due time. [`Timeline::pop_due`] hands them back in due order; steps
//! that fall due at the same instant come back in scheduling order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::{CarId, ContainerId, HoleId};

/// A deferred step of the matching flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    HoleArrived {
        hole: HoleId,
        container: ContainerId,
        skip_full_check: bool,
    },
    CarArrived { car: CarId },
    ContainerCleared { container: ContainerId },
    CarRemoved { car: CarId },
    CarReturned { car: CarId },
    Sweep,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due_ms: u64,
    seq: u64,
    step: Continuation,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now_ms: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u32, step: Continuation) {
        let entry = Entry {
            due_ms: self.now_ms + u64::from(delay_ms),
            seq: self.next_seq,
            step,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(entry));
    }

    /// Schedule a sweep unless one is already queued for the same instant or
    /// earlier.
    pub fn schedule_sweep(&mut self, delay_ms: u32) {
        let due = self.now_ms + u64::from(delay_ms);
        let already = self
            .queue
            .iter()
            .any(|Reverse(e)| e.step == Continuation::Sweep && e.due_ms <= due);
        if !already {
            self.schedule(delay_ms, Continuation::Sweep);
        }
    }

    pub fn advance(&mut self, elapsed_ms: u32) {
        self.now_ms += u64::from(elapsed_ms);
    }

    /// Next continuation whose due time has been reached.
    pub fn pop_due(&mut self) -> Option<Continuation> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.due_ms <= self.now_ms => {
                self.queue.pop().map(|Reverse(e)| e.step)
            }
            _ => None,
        }
    }

    /// Drop every pending continuation. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        n
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_then_schedule_order() {
        let mut t = Timeline::new();
        t.schedule(20, Continuation::CarRemoved { car: CarId(1) });
        t.schedule(10, Continuation::CarRemoved { car: CarId(2) });
        t.schedule(10, Continuation::CarRemoved { car: CarId(3) });

        assert_eq!(t.pop_due(), None);
        t.advance(10);
        assert_eq!(t.pop_due(), Some(Continuation::CarRemoved { car: CarId(2) }));
        assert_eq!(t.pop_due(), Some(Continuation::CarRemoved { car: CarId(3) }));
        assert_eq!(t.pop_due(), None);
        t.advance(10);
        assert_eq!(t.pop_due(), Some(Continuation::CarRemoved { car: CarId(1) }));
    }

    #[test]
    fn sweeps_coalesce() {
        let mut t = Timeline::new();
        t.schedule_sweep(300);
        t.schedule_sweep(300);
        t.schedule_sweep(500);
        assert_eq!(t.pending(), 1);
        t.schedule_sweep(0);
        assert_eq!(t.pending(), 2);
    }

    #[test]
    fn cancel_all_empties_queue() {
        let mut t = Timeline::new();
        t.schedule(5, Continuation::Sweep);
        t.schedule(5, Continuation::CarArrived { car: CarId(0) });
        assert_eq!(t.cancel_all(), 2);
        t.advance(100);
        assert_eq!(t.pop_due(), None);
    }
}
