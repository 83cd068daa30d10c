//! Splitting stage: one batch in, one [`SplitChunks`] out.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use tracing::trace;

use super::simple_transform::{SimpleTransform, SimpleTransformProcessor};
use crate::error::{ProcessorError, Result};
use crate::partitioner::{HashPartitioner, is_hashable};
use crate::port::{InputPort, OutputPort};
use crate::types::SplitChunks;

/// Splits every input batch into `num_outputs` batches by
/// `hash(key_columns) * num_outputs / 2^32`.
///
/// All pieces travel together as one [`SplitChunks`] through a single output
/// port; pair it with [`ResizeByHashTransform`](super::ResizeByHashTransform)
/// to spread them over separate ports.
#[derive(Debug)]
pub struct SplittingByHashTransform {
    header: SchemaRef,
    partitioner: HashPartitioner,
}

impl SplittingByHashTransform {
    /// Validate the configuration against `header` and build the stage.
    ///
    /// Fails with [`ProcessorError::Config`] for fewer than two outputs, an
    /// empty key set, a key index outside the schema, or a key column whose
    /// type cannot be hashed.
    pub fn try_new(header: SchemaRef, num_outputs: usize, key_columns: Vec<usize>) -> Result<Self> {
        if num_outputs <= 1 {
            return Err(ProcessorError::config(format!(
                "SplittingByHashTransform expects more than 1 outputs, got {num_outputs}"
            )));
        }

        if key_columns.is_empty() {
            return Err(ProcessorError::config(
                "SplittingByHashTransform cannot split by empty set of key columns",
            ));
        }

        let num_columns = header.fields().len();
        for &column in &key_columns {
            let Some(field) = header.fields().get(column) else {
                return Err(ProcessorError::config(format!(
                    "Invalid column number: {column}. There is only {num_columns} columns in header"
                )));
            };
            if !is_hashable(field.data_type()) {
                return Err(ProcessorError::config(format!(
                    "key column {} ({}) has unsupported type {}",
                    column,
                    field.name(),
                    field.data_type()
                )));
            }
        }

        Ok(Self {
            header,
            partitioner: HashPartitioner::new(key_columns, num_outputs),
        })
    }

    pub fn num_outputs(&self) -> usize {
        self.partitioner.num_outputs()
    }

    pub fn key_columns(&self) -> &[usize] {
        self.partitioner.key_columns()
    }

    pub fn header(&self) -> &SchemaRef {
        &self.header
    }

    /// Wrap the transform in its port host.
    pub fn into_processor(
        self,
        input: InputPort<RecordBatch>,
        output: OutputPort<SplitChunks>,
    ) -> SimpleTransformProcessor<Self> {
        SimpleTransformProcessor::new(self, input, output)
    }
}

impl SimpleTransform for SplittingByHashTransform {
    type Input = RecordBatch;
    type Output = SplitChunks;

    fn name(&self) -> &'static str {
        "SplittingByHash"
    }

    fn transform(&mut self, input: RecordBatch) -> Result<SplitChunks> {
        if input.num_columns() != self.header.fields().len() {
            return Err(ProcessorError::internal(format!(
                "SplittingByHashTransform header has {} columns but input batch has {}",
                self.header.fields().len(),
                input.num_columns()
            )));
        }

        let chunks = self.partitioner.partition(&input)?;
        trace!(
            rows = input.num_rows(),
            outputs = chunks.len(),
            "split batch by hash"
        );
        Ok(SplitChunks::new(chunks))
    }
}

#[cfg(test)]
#[path = "tests/splitting_by_hash_tests.rs"]
mod tests;
