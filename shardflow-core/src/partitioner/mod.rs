//! # Partitioner
//!
//! Splits a batch into `num_outputs` batches by a hash of its key columns.
//!
//! Three steps, each usable on its own:
//! 1. [`hash_columns`] folds the key columns into a [`WeakHash32`] buffer.
//! 2. [`fill_selector`] maps every 32-bit hash to a bucket with
//!    [`bucket_for_hash`]: bucket `i` owns `[i * 2^32 / n, (i + 1) * 2^32 / n)`.
//! 3. [`scatter_batch`] takes each bucket's rows out of every column,
//!    preserving row order.
//!
//! [`HashPartitioner`] bundles the three and keeps its buffers across calls.

pub mod hash;
pub mod scatter;

pub use hash::*;
pub use scatter::*;

use arrow::record_batch::RecordBatch;

use crate::error::{ProcessorError, Result};

/// Map a 32-bit hash onto `[0, num_outputs)`.
///
/// Computed as `h * n / 2^32` with a 64-bit intermediate, so the hash space
/// is cut into `n` contiguous ranges of equal size (within rounding).
#[inline]
pub fn bucket_for_hash(hash: u32, num_outputs: usize) -> usize {
    ((u64::from(hash) * num_outputs as u64) >> 32) as usize
}

/// Fill `selector` with one bucket index per hash.
pub fn fill_selector(hashes: &[u32], num_outputs: usize, selector: &mut Vec<usize>) {
    selector.clear();
    selector.extend(hashes.iter().map(|&h| bucket_for_hash(h, num_outputs)));
}

/// Reset `hash` to the batch's row count and fold in `key_columns` in order.
pub fn hash_columns(
    batch: &RecordBatch,
    key_columns: &[usize],
    hash: &mut WeakHash32,
) -> Result<()> {
    hash.reset(batch.num_rows());
    for &column_number in key_columns {
        let column = batch.columns().get(column_number).ok_or_else(|| {
            ProcessorError::internal(format!(
                "key column {column_number} out of range, batch has {} columns",
                batch.num_columns()
            ))
        })?;
        hash.update(column.as_ref())?;
    }
    Ok(())
}

/// Split `batch` into exactly `num_outputs` batches by the hash of `key_columns`.
///
/// Assumes validated arguments: `num_outputs >= 1` and a non-empty, in-range
/// key column list. Stages validate these when they are built.
pub fn partition(
    batch: &RecordBatch,
    key_columns: &[usize],
    num_outputs: usize,
) -> Result<Vec<RecordBatch>> {
    HashPartitioner::new(key_columns.to_vec(), num_outputs).partition(batch)
}

/// Reusable partitioner holding the hash and selector buffers between batches.
#[derive(Debug, Clone)]
pub struct HashPartitioner {
    key_columns: Vec<usize>,
    num_outputs: usize,
    hash: WeakHash32,
    selector: Vec<usize>,
}

impl HashPartitioner {
    pub fn new(key_columns: Vec<usize>, num_outputs: usize) -> Self {
        Self {
            key_columns,
            num_outputs,
            hash: WeakHash32::new(),
            selector: Vec::new(),
        }
    }

    pub fn key_columns(&self) -> &[usize] {
        &self.key_columns
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Hash, select and scatter one batch.
    pub fn partition(&mut self, batch: &RecordBatch) -> Result<Vec<RecordBatch>> {
        hash_columns(batch, &self.key_columns, &mut self.hash)?;
        fill_selector(self.hash.data(), self.num_outputs, &mut self.selector);
        scatter_batch(batch, &self.selector, self.num_outputs)
    }

    /// Hashes of the most recently partitioned batch.
    pub fn last_hashes(&self) -> &[u32] {
        self.hash.data()
    }
}

#[cfg(test)]
#[path = "tests/partitioner_tests.rs"]
mod tests;
