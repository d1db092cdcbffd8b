//! Distinct values and value frequencies.
//!
//! Both kernels sort the column once (ascending, nulls first) and collapse
//! runs of equal values, so every type the sort kernel supports is covered
//! and the output order matches [`sort`](super::sort()).

use arrow::array::{Array, ArrayRef, Int64Array};
use tracing::trace;

use super::kernel_column;
use super::sort::{equal_runs, sort_permutation};
use crate::error::Result;
use crate::types::SortOrder;

/// Returns each distinct value once, sorted ascending, with at most one
/// leading null.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`](crate::KernelError::NotImplemented)
/// for unsupported column types.
pub fn unique_values(column: &dyn Array) -> Result<ArrayRef> {
    trace!(rows = column.len(), data_type = %column.data_type(), "unique_values");
    let values = kernel_column(column, "unique")?;
    let permutation = sort_permutation(column, SortOrder::Ascending, "unique")?;
    let firsts: Vec<usize> = equal_runs(column, values, &permutation)
        .into_iter()
        .map(|run| permutation[run.start])
        .collect();
    Ok(values.gather(&firsts))
}

/// Returns the distinct values of `column` with the number of times each
/// occurs. Values are ordered as in [`unique_values`]; nulls are counted as
/// one leading bucket.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`](crate::KernelError::NotImplemented)
/// for unsupported column types.
pub fn count_values(column: &dyn Array) -> Result<(ArrayRef, Int64Array)> {
    trace!(rows = column.len(), data_type = %column.data_type(), "count_values");
    let values = kernel_column(column, "count_values")?;
    let permutation = sort_permutation(column, SortOrder::Ascending, "count_values")?;
    let runs = equal_runs(column, values, &permutation);

    let firsts: Vec<usize> = runs.iter().map(|run| permutation[run.start]).collect();
    let counts: Vec<i64> = runs.iter().map(|run| run.len() as i64).collect();
    Ok((values.gather(&firsts), Int64Array::from(counts)))
}
