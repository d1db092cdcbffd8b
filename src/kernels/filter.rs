//! Mask filtering through selection vectors.

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::record_batch::RecordBatch;
use tracing::trace;

use super::kernel_column;
use super::take::gather_batch;
use crate::error::{KernelError, Result};

/// Row positions kept by a filter, in output order.
///
/// [`ColumnBatch`](crate::batch::ColumnBatch) stacks these over an untouched
/// batch and only gathers rows when a kernel needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionVector {
    pub indices: Vec<usize>,
}

impl SelectionVector {
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        SelectionVector { indices }
    }

    /// Selects the rows where `mask` is true; null mask slots are not selected.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ShapeMismatch`] when the mask length differs
    /// from `rows`.
    pub fn from_mask(mask: &BooleanArray, rows: usize) -> Result<Self> {
        if mask.len() != rows {
            return Err(KernelError::ShapeMismatch {
                expected: rows,
                actual: mask.len(),
            });
        }
        let indices = mask
            .iter()
            .enumerate()
            .filter_map(|(i, selected)| (selected == Some(true)).then_some(i))
            .collect();
        Ok(SelectionVector { indices })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Underlying row for the `pos`-th selected row.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<usize> {
        self.indices.get(pos).copied()
    }
}

/// Returns the elements of `column` where `mask` is true.
///
/// # Errors
///
/// Returns [`KernelError::ShapeMismatch`] for a mask of the wrong length and
/// [`KernelError::NotImplemented`] for unsupported column types.
pub fn filter(column: &dyn Array, mask: &BooleanArray) -> Result<ArrayRef> {
    trace!(rows = column.len(), data_type = %column.data_type(), "filter");
    let values = kernel_column(column, "filter")?;
    let selection = SelectionVector::from_mask(mask, column.len())?;
    Ok(values.gather(&selection.indices))
}

/// Keeps the rows of `batch` where `mask` is true.
///
/// # Errors
///
/// Returns [`KernelError::ShapeMismatch`] when the mask length differs from
/// the row count, and propagates column errors without returning a partial
/// batch.
pub fn filter_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    let selection = SelectionVector::from_mask(mask, batch.num_rows())?;
    gather_batch(batch, &selection.indices, "filter")
}
