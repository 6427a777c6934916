//! Pending command queue shared by the network and simulation threads.
//!
//! Producers (request handlers) append under a short mutex window. The
//! simulation thread takes the whole backlog once per tick with
//! [`CommandQueue::drain_all`], which swaps the buffer out under the
//! same mutex. Because both sides synchronize on one lock, a command is
//! visible to the drain as soon as `enqueue` has returned.
//!
//! The queue is unbounded unless built with [`CommandQueue::bounded`].
//! Unbounded growth is accepted for the low request rates this bridge
//! serves; a bound changes observable behavior under load (requests get
//! rejected), so it is opt-in.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use defusal_types::Command;

/// Errors returned when a command cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue already holds `capacity` pending commands.
    #[error("command queue is full ({capacity} pending)")]
    Rejected {
        /// The configured maximum number of pending commands.
        capacity: usize,
    },
}

/// Multi-producer / single-consumer FIFO of pending commands.
#[derive(Debug, Default)]
pub struct CommandQueue {
    /// Pending commands, oldest first.
    pending: Mutex<VecDeque<Command>>,
    /// Maximum pending commands (0 = unbounded).
    capacity: usize,
}

impl CommandQueue {
    /// Create an unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue that rejects commands once `capacity` are pending.
    ///
    /// A capacity of 0 means unbounded.
    pub const fn bounded(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Append a command.
    ///
    /// Returns the number of pending commands including this one.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Rejected`] only for a bounded queue that is
    /// already full. An unbounded queue never fails.
    pub fn enqueue(&self, command: Command) -> Result<usize, QueueError> {
        let mut pending = self.lock();
        if self.capacity > 0 && pending.len() >= self.capacity {
            return Err(QueueError::Rejected {
                capacity: self.capacity,
            });
        }
        pending.push_back(command);
        Ok(pending.len())
    }

    /// Take every pending command in enqueue order, leaving the queue
    /// empty.
    ///
    /// Called by the simulation thread once per tick.
    pub fn drain_all(&self) -> Vec<Command> {
        let taken = std::mem::take(&mut *self.lock());
        Vec::from(taken)
    }

    /// Number of commands waiting for the next drain.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no commands are waiting.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Configured capacity, or `None` when unbounded.
    pub const fn capacity(&self) -> Option<usize> {
        if self.capacity == 0 {
            None
        } else {
            Some(self.capacity)
        }
    }

    // A panic while holding the lock cannot leave the deque half-written
    // (push_back and take are single operations), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Command>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
