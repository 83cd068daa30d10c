//! Bounded channels that connect an output port to an input port.
//!
//! Uses crossbeam-channel for the data slot and a small set of shared flags
//! for the scheduling protocol: the producer finishing, the consumer closing,
//! and the consumer asking for data. Nothing here blocks; a full slot is
//! reported through [`OutputPort::can_push`] and the caller yields.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::bounded;

use super::{InputPort, OutputPort};

/// Default port capacity.
///
/// A single slot means a producer can run at most one chunk ahead of its
/// consumer, which is what keeps per-stage memory bounded.
pub const DEFAULT_PORT_CAPACITY: usize = 1;

/// Flags shared by both halves of a port.
#[derive(Debug, Default)]
pub(crate) struct PortFlags {
    producer_finished: AtomicBool,
    consumer_closed: AtomicBool,
    needed: AtomicBool,
}

impl PortFlags {
    pub(crate) fn producer_finished(&self) -> bool {
        self.producer_finished.load(Ordering::Acquire)
    }

    pub(crate) fn finish_producer(&self) {
        self.producer_finished.store(true, Ordering::Release);
    }

    pub(crate) fn consumer_closed(&self) -> bool {
        self.consumer_closed.load(Ordering::Acquire)
    }

    pub(crate) fn close_consumer(&self) {
        self.consumer_closed.store(true, Ordering::Release);
    }

    pub(crate) fn needed(&self) -> bool {
        self.needed.load(Ordering::Acquire)
    }

    pub(crate) fn set_needed(&self, needed: bool) {
        self.needed.store(needed, Ordering::Release);
    }
}

/// Create a connected port pair with room for `capacity` chunks.
///
/// Returns `(output, input)`: the producer keeps the output half and the
/// consumer keeps the input half.
///
/// # Panics
/// Panics if `capacity` is zero; a rendezvous port could never accept a push.
pub fn channel<T>(capacity: usize) -> (OutputPort<T>, InputPort<T>) {
    assert!(capacity > 0, "port capacity must be at least 1");
    let (sender, receiver) = bounded(capacity);
    let flags = Arc::new(PortFlags::default());
    (
        OutputPort::new(sender, Arc::clone(&flags)),
        InputPort::new(receiver, flags),
    )
}

/// Create a port pair with [`DEFAULT_PORT_CAPACITY`].
pub fn channel_default<T>() -> (OutputPort<T>, InputPort<T>) {
    channel(DEFAULT_PORT_CAPACITY)
}

#[cfg(test)]
#[path = "tests/channel_tests.rs"]
mod tests;
