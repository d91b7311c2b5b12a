//! Bounded admission queue shared by the acceptor and the workers.
//!
//! # Responsibilities
//! - Hold accepted connections until a worker claims them
//! - Decide admission and enqueue in one locked step
//! - Block workers while the queue is empty
//!
//! # Design Decisions
//! - `try_admit` never blocks: a full queue hands the item straight back
//! - FIFO order; each item is popped by exactly one worker
//! - Tracks how many workers are parked in `pop`, for diagnostics

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Outcome of [`AdmissionQueue::try_admit`].
#[derive(Debug, PartialEq, Eq)]
pub enum Admission<T> {
    /// Queued; `depth` is the queue length after the push.
    Admitted { depth: usize },
    /// Queue full; the item is returned to the caller.
    Rejected(T),
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    idle_workers: usize,
}

/// A fixed-capacity FIFO with a non-blocking push and a blocking pop.
#[derive(Debug)]
pub struct AdmissionQueue<T> {
    state: Mutex<State<T>>,
    available: Condvar,
    capacity: usize,
}

impl<T> AdmissionQueue<T> {
    /// Create a queue holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                idle_workers: 0,
            }),
            available: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue `item` if there is room, in one critical section.
    pub fn try_admit(&self, item: T) -> Admission<T> {
        let mut state = self.lock();
        if state.items.len() >= self.capacity {
            return Admission::Rejected(item);
        }
        state.items.push_back(item);
        let depth = state.items.len();
        drop(state);
        self.available.notify_one();
        Admission::Admitted { depth }
    }

    /// Take the oldest item, waiting while the queue is empty.
    pub fn pop(&self) -> T {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return item;
            }
            state.idle_workers += 1;
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.idle_workers -= 1;
        }
    }

    /// Items currently waiting.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Workers currently blocked in [`pop`](Self::pop).
    pub fn idle_workers(&self) -> usize {
        self.lock().idle_workers
    }
}
