//! Fan-out stage: one [`SplitChunks`] input, N batch outputs.
//!
//! Two phases driven by `prepare`:
//!
//! ```text
//!            pull payload            all outputs delivered
//! Consuming ─────────────► Generating ─────────────────────► Consuming
//!     │        (work)          │  ▲
//!     │                        └──┘ some output full: PortFull
//!     └─► Finished (input exhausted, or every output finished)
//! ```
//!
//! `work` runs once per payload and only unpacks it. Delivery happens in
//! `prepare`, one push per ready output, so progress across many scheduler
//! calls is tracked by the per-output delivery table.

use arrow::record_batch::RecordBatch;
use tracing::{debug, trace};

use crate::error::{ProcessorError, Result};
use crate::port::{InputPort, OutputPort};
use crate::processor::{Processor, Status};
use crate::types::SplitChunks;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Consuming,
    Generating,
}

/// Routes the `i`-th batch of each [`SplitChunks`] to output `i`.
pub struct ResizeByHashTransform {
    input: InputPort<SplitChunks>,
    outputs: Vec<OutputPort<RecordBatch>>,
    phase: Phase,
    /// Payload pulled in `Consuming`, unpacked by `work`.
    input_chunk: Option<SplitChunks>,
    /// Sub-batches of the current payload not yet handed to their output.
    output_chunks: Vec<Option<RecordBatch>>,
    /// Per-output delivery table for the current payload.
    was_output_processed: Vec<bool>,
}

impl ResizeByHashTransform {
    /// Build the stage. Fails with [`ProcessorError::Config`] for fewer than
    /// two outputs.
    pub fn try_new(
        input: InputPort<SplitChunks>,
        outputs: Vec<OutputPort<RecordBatch>>,
    ) -> Result<Self> {
        if outputs.len() <= 1 {
            return Err(ProcessorError::config(format!(
                "ResizeByHashTransform expects more than 1 outputs, got {}",
                outputs.len()
            )));
        }

        let num_outputs = outputs.len();
        Ok(Self {
            input,
            outputs,
            phase: Phase::Consuming,
            input_chunk: None,
            output_chunks: Vec::with_capacity(num_outputs),
            was_output_processed: vec![false; num_outputs],
        })
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// True while the current payload still has undelivered sub-batches.
    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Generating
    }

    fn prepare_consume(&mut self) -> Result<Status> {
        let mut all_finished = true;
        let mut any_can_push = false;
        for output in &self.outputs {
            if output.is_finished() {
                continue;
            }
            all_finished = false;
            any_can_push |= output.can_push();
        }

        if all_finished {
            debug!("all outputs finished, closing input");
            self.input.close();
            return Ok(Status::Finished);
        }

        // Pulling is pointless while no live output could take a chunk.
        if !any_can_push {
            return Ok(Status::PortFull);
        }

        if self.input.is_finished() {
            debug!("input exhausted, finishing {} outputs", self.outputs.len());
            for output in &self.outputs {
                output.finish();
            }
            return Ok(Status::Finished);
        }

        self.input.set_needed();
        let Some(chunk) = self.input.pull() else {
            return Ok(Status::NeedData);
        };

        self.input_chunk = Some(chunk);
        self.phase = Phase::Generating;
        trace!("consuming -> generating");
        Ok(Status::Ready)
    }

    fn prepare_generate(&mut self) -> Result<Status> {
        let mut all_outputs_processed = true;

        let slots = self
            .outputs
            .iter()
            .zip(self.output_chunks.iter_mut())
            .zip(self.was_output_processed.iter_mut());

        for ((output, chunk), processed) in slots {
            if *processed {
                continue;
            }

            let has_rows = chunk.as_ref().is_some_and(|c| c.num_rows() > 0);

            // Nothing to deliver, or nobody left to deliver to.
            if !has_rows || output.is_finished() {
                *chunk = None;
                *processed = true;
                continue;
            }

            if !output.can_push() {
                all_outputs_processed = false;
                continue;
            }

            if let Some(chunk) = chunk.take() {
                output.push(chunk)?;
            }
            *processed = true;
        }

        if !all_outputs_processed {
            return Ok(Status::PortFull);
        }

        self.phase = Phase::Consuming;
        trace!("generating -> consuming");
        self.prepare_consume()
    }
}

impl Processor for ResizeByHashTransform {
    fn name(&self) -> &'static str {
        "ResizeByHash"
    }

    fn prepare(&mut self) -> Result<Status> {
        match self.phase {
            Phase::Generating if self.input_chunk.is_none() => self.prepare_generate(),
            // A pulled payload not yet unpacked: work must run first.
            Phase::Generating => Ok(Status::Ready),
            Phase::Consuming => self.prepare_consume(),
        }
    }

    fn work(&mut self) -> Result<()> {
        if self.phase != Phase::Generating {
            return Err(ProcessorError::internal(
                "ResizeByHashTransform::work called outside of the generating phase",
            ));
        }
        let chunk = self.input_chunk.take().ok_or_else(|| {
            ProcessorError::internal("ResizeByHashTransform expected a pulled payload in work")
        })?;

        if chunk.len() != self.outputs.len() {
            return Err(ProcessorError::internal(format!(
                "ResizeByHashTransform expected {} chunks for input but got {}",
                self.outputs.len(),
                chunk.len()
            )));
        }

        let chunks = chunk.into_chunks();
        debug!(
            rows = ?chunks.iter().map(RecordBatch::num_rows).collect::<Vec<_>>(),
            "unpacked split payload"
        );

        self.output_chunks.clear();
        self.output_chunks.extend(chunks.into_iter().map(Some));
        self.was_output_processed.clear();
        self.was_output_processed.resize(self.outputs.len(), false);
        Ok(())
    }
}

impl std::fmt::Debug for ResizeByHashTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeByHashTransform")
            .field("phase", &self.phase)
            .field("outputs", &self.outputs.len())
            .field("was_output_processed", &self.was_output_processed)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/resize_by_hash_tests.rs"]
mod tests;
