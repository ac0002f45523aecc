//! Round-robin queue.
//!
//! FIFO of process handles. Used for both the ready queue and the I/O-wait
//! queue; a process that times out goes to the tail behind everything
//! already waiting.

use std::collections::VecDeque;

use crate::process::ProcessHandle;

/// Queue of processes waiting for the CPU (or for I/O).
#[derive(Debug, Default, Clone)]
pub struct RoundRobinQueue {
    handles: VecDeque<ProcessHandle>,
}

impl RoundRobinQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        RoundRobinQueue {
            handles: VecDeque::new(),
        }
    }

    /// Add a process to the end of the queue.
    pub fn enqueue(&mut self, handle: ProcessHandle) {
        self.handles.push_back(handle);
    }

    /// Remove and return the process at the front of the queue.
    pub fn dequeue(&mut self) -> Option<ProcessHandle> {
        self.handles.pop_front()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Get the number of queued processes.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Queued handles, front first.
    pub fn iter(&self) -> impl Iterator<Item = ProcessHandle> + '_ {
        self.handles.iter().copied()
    }

    /// Empty the queue, yielding handles front first.
    pub fn drain(&mut self) -> impl Iterator<Item = ProcessHandle> + '_ {
        self.handles.drain(..)
    }
}

impl Extend<ProcessHandle> for RoundRobinQueue {
    fn extend<T: IntoIterator<Item = ProcessHandle>>(&mut self, iter: T) {
        self.handles.extend(iter);
    }
}
