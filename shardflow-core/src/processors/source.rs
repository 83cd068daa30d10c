//! Source processor emitting batches from an iterator.

use arrow::record_batch::RecordBatch;
use tracing::trace;

use crate::error::Result;
use crate::port::OutputPort;
use crate::processor::{Processor, Status};

/// Emits every batch of an iterator, then finishes its output.
pub struct BatchSource {
    batches: Box<dyn Iterator<Item = RecordBatch> + Send>,
    output: OutputPort<RecordBatch>,
    current: Option<RecordBatch>,
    exhausted: bool,
    emitted: usize,
}

impl BatchSource {
    pub fn new<I>(batches: I, output: OutputPort<RecordBatch>) -> Self
    where
        I: IntoIterator<Item = RecordBatch>,
        I::IntoIter: Send + 'static,
    {
        Self {
            batches: Box::new(batches.into_iter()),
            output,
            current: None,
            exhausted: false,
            emitted: 0,
        }
    }

    /// Batches pushed so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl Processor for BatchSource {
    fn name(&self) -> &'static str {
        "BatchSource"
    }

    fn prepare(&mut self) -> Result<Status> {
        if self.output.is_finished() {
            return Ok(Status::Finished);
        }

        // `exhausted` is only set once the last batch has been pushed.
        if self.exhausted {
            trace!(batches = self.emitted, "source exhausted");
            self.output.finish();
            return Ok(Status::Finished);
        }

        if !self.output.can_push() {
            return Ok(Status::PortFull);
        }

        if let Some(batch) = self.current.take() {
            self.output.push(batch)?;
            self.emitted += 1;
        }

        if !self.output.can_push() {
            return Ok(Status::PortFull);
        }
        Ok(Status::Ready)
    }

    fn work(&mut self) -> Result<()> {
        match self.batches.next() {
            Some(batch) => self.current = Some(batch),
            None => self.exhausted = true,
        }
        Ok(())
    }
}
