//! The cooperative processor contract.
//!
//! A scheduler drives every processor through two calls:
//!
//! ```text
//! loop {
//!     match processor.prepare()? {
//!         Ready    => processor.work()?,
//!         NeedData => revisit after upstream pushed,
//!         PortFull => revisit after downstream pulled,
//!         Finished => stop polling this processor,
//!     }
//! }
//! ```
//!
//! `prepare` only moves chunks between ports and the processor's own slots;
//! `work` does the data processing. Neither may block.

use crate::error::Result;

/// Outcome of [`Processor::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Waiting for a chunk on an input port.
    NeedData,
    /// Waiting for room on an output port.
    PortFull,
    /// Done; the processor has finished or closed all of its ports.
    Finished,
    /// `work` should be called next.
    Ready,
}

/// A node of the execution graph.
///
/// `Send` so pipeline-parallel executors can move processors onto worker
/// threads. A given processor is only ever driven by one thread at a time.
pub trait Processor: Send {
    /// Short, stable name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Non-blocking status query. May be called any number of times.
    fn prepare(&mut self) -> Result<Status>;

    /// Run the pending unit of work. Only called after `prepare` returned
    /// [`Status::Ready`].
    fn work(&mut self) -> Result<()>;
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn prepare(&mut self) -> Result<Status> {
        (**self).prepare()
    }

    fn work(&mut self) -> Result<()> {
        (**self).work()
    }
}
