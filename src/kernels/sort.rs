//! Stable, null-first sorting, nth-element selection and ranking.

use std::cmp::Ordering;
use std::ops::Range;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array};
use arrow::record_batch::RecordBatch;
use tracing::trace;

use super::{kernel_column, take, KernelColumn};
use crate::batch::column_by_name;
use crate::error::{KernelError, Result};
use crate::types::{Scalar, SortOrder};

/// Orders two positions: nulls first, then values under `order`.
fn compare_positions(
    column: &dyn Array,
    values: &dyn KernelColumn,
    order: SortOrder,
    a: usize,
    b: usize,
) -> Ordering {
    match (column.is_null(a), column.is_null(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => order.apply(values.compare_at(a, b)),
    }
}

/// Computes the sorting permutation of `column` as positions.
pub(crate) fn sort_permutation(
    column: &dyn Array,
    order: SortOrder,
    operation: &'static str,
) -> Result<Vec<usize>> {
    let values = kernel_column(column, operation)?;
    let mut permutation: Vec<usize> = (0..column.len()).collect();
    // `sort_by` is stable, so ties keep their input order.
    permutation.sort_by(|&a, &b| compare_positions(column, values, order, a, b));
    Ok(permutation)
}

/// Splits a permutation into runs of equal values (nulls equal each other).
pub(crate) fn equal_runs(
    column: &dyn Array,
    values: &dyn KernelColumn,
    permutation: &[usize],
) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for pos in 1..=permutation.len() {
        let boundary = pos == permutation.len()
            || compare_positions(
                column,
                values,
                SortOrder::Ascending,
                permutation[pos - 1],
                permutation[pos],
            ) != Ordering::Equal;
        if boundary {
            runs.push(start..pos);
            start = pos;
        }
    }
    runs
}

fn positions_to_indices(positions: &[usize]) -> Result<Int64Array> {
    let indices = positions
        .iter()
        .map(|&p| {
            i64::try_from(p)
                .map_err(|_| KernelError::InvalidArgument(format!("position {p} exceeds i64")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Int64Array::from(indices))
}

/// Returns the indices that would sort `column`.
///
/// Nulls always come first regardless of `order`; the sort is stable.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] for unsupported column types.
pub fn sort_indices(column: &dyn Array, order: SortOrder) -> Result<Int64Array> {
    trace!(rows = column.len(), data_type = %column.data_type(), ?order, "sort_indices");
    let permutation = sort_permutation(column, order, "sort")?;
    positions_to_indices(&permutation)
}

/// Returns a sorted copy of `column`.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] for unsupported column types.
pub fn sort(column: &dyn Array, order: SortOrder) -> Result<ArrayRef> {
    let indices = sort_indices(column, order)?;
    take(column, &indices)
}

/// Returns the value at rank `n` (0-indexed) of the sorted column.
///
/// A null at that rank yields [`Scalar::Null`].
///
/// # Errors
///
/// Returns [`KernelError::IndexOutOfBounds`] when `n` is negative or not
/// below the column length, and [`KernelError::NotImplemented`] for
/// unsupported column types.
pub fn nth_element(column: &dyn Array, n: i64, order: SortOrder) -> Result<Scalar> {
    let len = column.len();
    let rank = usize::try_from(n)
        .ok()
        .filter(|&r| r < len)
        .ok_or(KernelError::IndexOutOfBounds { index: n, len })?;

    let values = kernel_column(column, "nth_element")?;
    let permutation = sort_permutation(column, order, "nth_element")?;
    Ok(values.scalar_at(permutation[rank]))
}

/// Returns, for each position, its position in the sorted output.
///
/// Ties receive distinct consecutive ranks in stable order; see
/// [`rank_average`] for tie-averaged ranks.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] for unsupported column types.
pub fn rank(column: &dyn Array, order: SortOrder) -> Result<Int64Array> {
    trace!(rows = column.len(), data_type = %column.data_type(), ?order, "rank");
    let permutation = sort_permutation(column, order, "rank")?;
    let mut ranks = vec![0usize; permutation.len()];
    for (position, &row) in permutation.iter().enumerate() {
        ranks[row] = position;
    }
    positions_to_indices(&ranks)
}

/// Returns 0-based statistical ranks where tied values share the average of
/// their positional ranks. Nulls tie with each other.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] for unsupported column types.
pub fn rank_average(column: &dyn Array, order: SortOrder) -> Result<Float64Array> {
    let values = kernel_column(column, "rank")?;
    let permutation = sort_permutation(column, order, "rank")?;
    let mut ranks = vec![0.0f64; permutation.len()];
    for run in equal_runs(column, values, &permutation) {
        let average = (run.start + run.end - 1) as f64 / 2.0;
        for &row in &permutation[run] {
            ranks[row] = average;
        }
    }
    Ok(Float64Array::from(ranks))
}

/// Sorts every column of `batch` by the values of `column_name`.
///
/// # Errors
///
/// Returns [`KernelError::ColumnNotFound`] for an unknown column, and
/// propagates any kernel error raised by the key or a gathered column.
pub fn sort_batch(batch: &RecordBatch, column_name: &str, order: SortOrder) -> Result<RecordBatch> {
    let key = column_by_name(batch, column_name)?;
    let indices = sort_indices(key.as_ref(), order)?;
    super::take_batch(batch, &indices)
}
