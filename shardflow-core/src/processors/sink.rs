//! Sink processor collecting batches into a shared buffer.

use std::sync::{Arc, Mutex, PoisonError};

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::port::InputPort;
use crate::processor::{Processor, Status};

/// Shared handle to the batches received by a [`CollectSink`].
///
/// Cloned handles observe the same buffer, so callers keep one while the
/// sink itself is moved into an executor.
#[derive(Debug, Clone, Default)]
pub struct CollectedBatches(Arc<Mutex<Vec<RecordBatch>>>);

impl CollectedBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the batches received so far, in arrival order.
    pub fn batches(&self) -> Vec<RecordBatch> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn num_batches(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn num_rows(&self) -> usize {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(RecordBatch::num_rows)
            .sum()
    }

    fn push(&self, batch: RecordBatch) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch);
    }
}

/// Pulls every batch from its input and appends it to a [`CollectedBatches`].
pub struct CollectSink {
    input: InputPort<RecordBatch>,
    collected: CollectedBatches,
    current: Option<RecordBatch>,
}

impl CollectSink {
    pub fn new(input: InputPort<RecordBatch>) -> Self {
        Self::with_handle(input, CollectedBatches::new())
    }

    pub fn with_handle(input: InputPort<RecordBatch>, collected: CollectedBatches) -> Self {
        Self {
            input,
            collected,
            current: None,
        }
    }

    pub fn handle(&self) -> CollectedBatches {
        self.collected.clone()
    }
}

impl Processor for CollectSink {
    fn name(&self) -> &'static str {
        "CollectSink"
    }

    fn prepare(&mut self) -> Result<Status> {
        if self.current.is_some() {
            return Ok(Status::Ready);
        }

        if self.input.is_finished() {
            return Ok(Status::Finished);
        }

        self.input.set_needed();
        match self.input.pull() {
            Some(batch) => {
                self.current = Some(batch);
                Ok(Status::Ready)
            }
            None => Ok(Status::NeedData),
        }
    }

    fn work(&mut self) -> Result<()> {
        if let Some(batch) = self.current.take() {
            self.collected.push(batch);
        }
        Ok(())
    }
}
