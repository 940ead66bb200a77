//! Cooperative timer queue
//!
//! Replaces ambient interval/timeout timers: every movement tick and every
//! one-shot phase delay is an entry here, fired in `(due, sequence)` order as
//! the simulation clock advances. Cancellation is lazy: owners drop their
//! `TimerId` and stale entries are skipped when they come due.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::entity::EntityRef;
use super::sequencer::Cue;

/// Handle identifying one timer (a movement's interval or a delay)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// What happens when a timer comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fire {
    /// One interpolation step of an entity's active movement
    Tick(EntityRef),
    /// A one-shot delay elapsed; dispatch its continuation
    Delay(Cue),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due_ms: u64,
    seq: u64,
    id: TimerId,
    fire: Fire,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Millisecond clock plus pending timers
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Start an interval timer; the first tick fires one interval from now
    pub fn every(&mut self, interval_ms: u64, entity: EntityRef) -> TimerId {
        let id = self.allocate();
        self.push(self.now_ms + interval_ms, id, Fire::Tick(entity));
        id
    }

    /// Queue the next tick of an interval timer that just fired
    pub fn rearm(&mut self, id: TimerId, interval_ms: u64, entity: EntityRef) {
        self.push(self.now_ms + interval_ms, id, Fire::Tick(entity));
    }

    /// Fire `cue` once after `delay_ms`
    pub fn after(&mut self, delay_ms: u64, cue: Cue) -> TimerId {
        let id = self.allocate();
        self.push(self.now_ms + delay_ms, id, Fire::Delay(cue));
        id
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to it
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, Fire)> {
        let due = self.next_due()?;
        if due > until_ms {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some((entry.id, entry.fire))
    }

    /// Move the clock forward once every due timer has fired
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(e)| e.due_ms)
    }

    /// Drop every pending timer; the clock keeps running
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    fn allocate(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, due_ms: u64, id: TimerId, fire: Fire) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due_ms,
            seq,
            id,
            fire,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_then_insertion_order() {
        let mut sched = Scheduler::new();
        let late = sched.after(200, Cue::DropSettled);
        let rail = sched.every(100, EntityRef::Rail);
        let joint = sched.every(100, EntityRef::Joint);

        assert_eq!(sched.pop_due(99), None);
        assert_eq!(sched.pop_due(1000), Some((rail, Fire::Tick(EntityRef::Rail))));
        assert_eq!(sched.now_ms(), 100);
        assert_eq!(sched.pop_due(1000), Some((joint, Fire::Tick(EntityRef::Joint))));
        assert_eq!(sched.pop_due(1000), Some((late, Fire::Delay(Cue::DropSettled))));
        assert_eq!(sched.pop_due(1000), None);
    }

    #[test]
    fn test_rearm_keeps_id() {
        let mut sched = Scheduler::new();
        let id = sched.every(50, EntityRef::Arm);
        let (fired, _) = sched.pop_due(50).unwrap();
        assert_eq!(fired, id);
        sched.rearm(id, 50, EntityRef::Arm);
        assert_eq!(sched.next_due(), Some(100));
        assert_eq!(sched.pop_due(100).map(|(id, _)| id), Some(id));
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut sched = Scheduler::new();
        sched.advance_to(500);
        sched.advance_to(300);
        assert_eq!(sched.now_ms(), 500);
        sched.after(0, Cue::Grab);
        assert!(sched.pop_due(500).is_some());
        assert_eq!(sched.now_ms(), 500);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut sched = Scheduler::new();
        sched.after(10, Cue::Grab);
        sched.every(10, EntityRef::Rail);
        sched.clear();
        assert_eq!(sched.next_due(), None);
        assert_eq!(sched.pop_due(u64::MAX), None);
    }
}
