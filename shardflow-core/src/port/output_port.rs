//! Producer half of a port.

use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};

use super::channel::PortFlags;
use crate::error::{ProcessorError, Result};

/// OutputPort pushes chunks to exactly one downstream [`InputPort`](super::InputPort).
///
/// Pushing never blocks. A processor checks [`can_push`](Self::can_push)
/// first and reports `PortFull` to the scheduler when it returns false.
pub struct OutputPort<T> {
    sender: Sender<T>,
    flags: Arc<PortFlags>,
}

impl<T> OutputPort<T> {
    pub(crate) fn new(sender: Sender<T>, flags: Arc<PortFlags>) -> Self {
        Self { sender, flags }
    }

    /// True when the port is live and has a free slot.
    pub fn can_push(&self) -> bool {
        !self.is_finished() && !self.sender.is_full()
    }

    /// Move a chunk into the port.
    ///
    /// Pushing into a full or finished port is a protocol violation by the
    /// caller and is reported as [`ProcessorError::Port`].
    pub fn push(&self, chunk: T) -> Result<()> {
        if self.is_finished() {
            return Err(ProcessorError::Port("push into finished port".to_string()));
        }
        self.sender.try_send(chunk).map_err(|err| match err {
            TrySendError::Full(_) => ProcessorError::Port("push into full port".to_string()),
            TrySendError::Disconnected(_) => {
                ProcessorError::Port("push into port whose consumer was dropped".to_string())
            }
        })
    }

    /// Signal that no more chunks will be pushed.
    ///
    /// Chunks already in the port stay readable by the consumer.
    pub fn finish(&self) {
        self.flags.finish_producer();
    }

    /// True once either side has given up on this port.
    pub fn is_finished(&self) -> bool {
        self.flags.producer_finished() || self.flags.consumer_closed()
    }

    /// Whether the consumer currently asks for data.
    pub fn is_needed(&self) -> bool {
        self.flags.needed()
    }

    /// Number of chunks waiting in the port.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

impl<T> Drop for OutputPort<T> {
    fn drop(&mut self) {
        self.flags.finish_producer();
    }
}

impl<T> std::fmt::Debug for OutputPort<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputPort")
            .field("queued", &self.sender.len())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/output_port_tests.rs"]
mod tests;
