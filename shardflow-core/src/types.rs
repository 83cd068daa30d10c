use arrow::record_batch::RecordBatch;

/// Index of an output stream of a fan-out stage.
pub type OutputIndex = usize;

/// One input batch split into per-output batches.
///
/// Produced by [`SplittingByHashTransform`](crate::processors::SplittingByHashTransform)
/// and consumed by [`ResizeByHashTransform`](crate::processors::ResizeByHashTransform).
/// Entry `i` belongs to output `i`; entries may hold zero rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitChunks {
    chunks: Vec<RecordBatch>,
}

impl SplitChunks {
    pub fn new(chunks: Vec<RecordBatch>) -> Self {
        Self { chunks }
    }

    /// Number of per-output batches.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total rows across all outputs.
    pub fn num_rows(&self) -> usize {
        self.chunks.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn chunks(&self) -> &[RecordBatch] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<RecordBatch> {
        self.chunks
    }
}

impl From<Vec<RecordBatch>> for SplitChunks {
    fn from(chunks: Vec<RecordBatch>) -> Self {
        Self::new(chunks)
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
