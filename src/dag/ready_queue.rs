// src/dag/ready_queue.rs

//! Priority queue of tasks whose dependencies are all satisfied.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use tracing::warn;

use crate::dag::graph::TaskKey;

/// A ready task together with its fan-out at enqueue time.
///
/// The fan-out is only an ordering key: tasks that unblock more downstream
/// work are handed to workers first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyEntry<T> {
    pub task: T,
    pub fan_out: usize,
}

impl<T> ReadyEntry<T> {
    pub fn new(task: T, fan_out: usize) -> Self {
        Self { task, fan_out }
    }
}

/// Heap slot: highest fan-out first, FIFO among equal fan-out.
#[derive(Debug)]
struct Slot<T> {
    fan_out: usize,
    seq: Reverse<u64>,
    entry: ReadyEntry<T>,
}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Slot<T> {}

impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Slot<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fan_out
            .cmp(&other.fan_out)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Ready queue ordered by descending fan-out.
///
/// The queue itself is not synchronised; it lives inside the coordinator's
/// locked state together with the remaining-dependency counts, so a promotion
/// from counts to queue is a single atomic step. Blocking dequeue is provided
/// by the engine on top of that lock.
///
/// Every task is admitted at most once over the queue's lifetime; a second
/// `push` of the same task is refused.
#[derive(Debug)]
pub struct ReadyQueue<T: TaskKey> {
    heap: BinaryHeap<Slot<T>>,
    admitted: HashSet<T>,
    next_seq: u64,
}

impl<T: TaskKey> Default for ReadyQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            admitted: HashSet::new(),
            next_seq: 0,
        }
    }
}

impl<T: TaskKey> ReadyQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `entry`. Returns `false` (and leaves the queue untouched) if the
    /// task was already admitted earlier.
    pub fn push(&mut self, entry: ReadyEntry<T>) -> bool {
        if !self.admitted.insert(entry.task.clone()) {
            warn!(task = %entry.task, "task already admitted to ready queue; ignoring");
            return false;
        }

        let seq = Reverse(self.next_seq);
        self.next_seq += 1;
        self.heap.push(Slot {
            fan_out: entry.fan_out,
            seq,
            entry,
        });
        true
    }

    /// Remove and return the entry with the highest fan-out.
    pub fn pop(&mut self) -> Option<ReadyEntry<T>> {
        self.heap.pop().map(|slot| slot.entry)
    }

    pub fn peek(&self) -> Option<&ReadyEntry<T>> {
        self.heap.peek().map(|slot| &slot.entry)
    }

    /// Whether `task` has ever been admitted (popped entries included).
    pub fn was_admitted(&self, task: &T) -> bool {
        self.admitted.contains(task)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T: TaskKey> Extend<ReadyEntry<T>> for ReadyQueue<T> {
    fn extend<I: IntoIterator<Item = ReadyEntry<T>>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}
