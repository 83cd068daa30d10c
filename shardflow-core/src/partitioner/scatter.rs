//! Stable scatter of a batch into per-bucket batches.

use arrow::array::{ArrayRef, UInt32Array};
use arrow::compute::take;
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{ProcessorError, Result};

/// Split `batch` into `num_outputs` batches following `selector`.
///
/// Row `r` goes to batch `selector[r]`. Rows keep their relative order
/// inside each output. Buckets with no rows come back as zero-row batches
/// with the input schema.
pub fn scatter_batch(
    batch: &RecordBatch,
    selector: &[usize],
    num_outputs: usize,
) -> Result<Vec<RecordBatch>> {
    let num_rows = batch.num_rows();
    if selector.len() != num_rows {
        return Err(ProcessorError::internal(format!(
            "size of selector: {} doesn't match number of rows: {}",
            selector.len(),
            num_rows
        )));
    }

    let indices = bucket_indices(selector, num_outputs)?;

    let schema = batch.schema();
    indices
        .into_iter()
        .map(|rows| -> Result<RecordBatch> {
            let row_count = rows.len();
            let rows = UInt32Array::from(rows);
            let columns = batch
                .columns()
                .iter()
                .map(|column| take(column.as_ref(), &rows, None))
                .collect::<Result<Vec<ArrayRef>, ArrowError>>()?;
            let options = RecordBatchOptions::new().with_row_count(Some(row_count));
            Ok(RecordBatch::try_new_with_options(
                schema.clone(),
                columns,
                &options,
            )?)
        })
        .collect()
}

/// Ascending row indices per bucket.
fn bucket_indices(selector: &[usize], num_outputs: usize) -> Result<Vec<Vec<u32>>> {
    // Slight over-reservation for an even spread.
    let reserve = selector.len() * 11 / (num_outputs.max(1) * 10);
    let mut indices: Vec<Vec<u32>> = (0..num_outputs)
        .map(|_| Vec::with_capacity(reserve))
        .collect();

    for (row, &bucket) in selector.iter().enumerate() {
        let row = u32::try_from(row).map_err(|_| {
            ProcessorError::internal(format!("row index {row} does not fit a u32 take index"))
        })?;
        match indices.get_mut(bucket) {
            Some(rows) => rows.push(row),
            None => {
                return Err(ProcessorError::internal(format!(
                    "selector bucket {bucket} out of range for {num_outputs} outputs"
                )));
            }
        }
    }
    Ok(indices)
}
