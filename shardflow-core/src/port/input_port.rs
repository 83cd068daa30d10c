//! Consumer half of a port.

use std::sync::Arc;

use crossbeam_channel::Receiver;

use super::channel::PortFlags;

/// InputPort pulls chunks pushed by one upstream [`OutputPort`](super::OutputPort).
///
/// Tracks the producer's end of stream and the consumer's own close, so a
/// processor can tell "nothing yet" ([`has_data`](Self::has_data) is false)
/// apart from "nothing ever again" ([`is_finished`](Self::is_finished)).
pub struct InputPort<T> {
    receiver: Receiver<T>,
    flags: Arc<PortFlags>,
}

impl<T> InputPort<T> {
    pub(crate) fn new(receiver: Receiver<T>, flags: Arc<PortFlags>) -> Self {
        Self { receiver, flags }
    }

    /// True when a chunk can be pulled right now.
    pub fn has_data(&self) -> bool {
        !self.flags.consumer_closed() && !self.receiver.is_empty()
    }

    /// Take the next chunk, if any. Never blocks.
    pub fn pull(&self) -> Option<T> {
        if self.flags.consumer_closed() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// True when the port is closed, or the producer finished and every
    /// pushed chunk has been pulled.
    pub fn is_finished(&self) -> bool {
        if self.flags.consumer_closed() {
            return true;
        }
        // Producer flag first: a push that happened before `finish` is then
        // guaranteed visible to the emptiness check.
        self.flags.producer_finished() && self.receiver.is_empty()
    }

    pub fn set_needed(&self) {
        self.flags.set_needed(true);
    }

    pub fn set_not_needed(&self) {
        self.flags.set_needed(false);
    }

    pub fn is_needed(&self) -> bool {
        self.flags.needed()
    }

    /// Stop consuming. The producer sees its output as finished and any
    /// buffered chunks are dropped.
    pub fn close(&self) {
        self.flags.close_consumer();
        self.flags.set_needed(false);
        while self.receiver.try_recv().is_ok() {}
    }

    pub fn is_closed(&self) -> bool {
        self.flags.consumer_closed()
    }
}

impl<T> Drop for InputPort<T> {
    fn drop(&mut self) {
        self.flags.close_consumer();
    }
}

impl<T> std::fmt::Debug for InputPort<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputPort")
            .field("queued", &self.receiver.len())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/input_port_tests.rs"]
mod tests;
