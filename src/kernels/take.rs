//! Gather kernel: builds new arrays from positions of a source array.

use arrow::array::{Array, ArrayRef, Int64Array};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use tracing::trace;

use super::kernel_column;
use crate::error::{KernelError, Result};

/// Validates `indices` against a source of length `len`.
pub(crate) fn checked_positions(indices: &Int64Array, len: usize) -> Result<Vec<usize>> {
    indices
        .iter()
        .map(|index| {
            let index = index.ok_or_else(|| {
                KernelError::InvalidArgument("take indices must not contain nulls".into())
            })?;
            usize::try_from(index)
                .ok()
                .filter(|&p| p < len)
                .ok_or(KernelError::IndexOutOfBounds { index, len })
        })
        .collect()
}

/// Returns `column[indices[k]]` for every `k`, preserving nulls.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] for unsupported column types,
/// [`KernelError::IndexOutOfBounds`] for an index outside the column, and
/// [`KernelError::InvalidArgument`] for a null index.
pub fn take(column: &dyn Array, indices: &Int64Array) -> Result<ArrayRef> {
    trace!(
        rows = column.len(),
        indices = indices.len(),
        data_type = %column.data_type(),
        "take"
    );
    let values = kernel_column(column, "take")?;
    let positions = checked_positions(indices, column.len())?;
    Ok(values.gather(&positions))
}

/// Gathers the same rows from every column of `batch`.
///
/// # Errors
///
/// Propagates the first error from any column; no partial batch is returned.
pub fn take_batch(batch: &RecordBatch, indices: &Int64Array) -> Result<RecordBatch> {
    let positions = checked_positions(indices, batch.num_rows())?;
    gather_batch(batch, &positions, "take")
}

/// Gathers already validated positions from every column of `batch`.
pub(crate) fn gather_batch(
    batch: &RecordBatch,
    positions: &[usize],
    operation: &'static str,
) -> Result<RecordBatch> {
    let columns = batch
        .columns()
        .iter()
        .map(|column| Ok(kernel_column(column.as_ref(), operation)?.gather(positions)))
        .collect::<Result<Vec<_>>>()?;
    let options = RecordBatchOptions::new().with_row_count(Some(positions.len()));
    Ok(RecordBatch::try_new_with_options(
        batch.schema(),
        columns,
        &options,
    )?)
}
