//! Variance, standard deviation, mode and quantiles.

use arrow::array::Array;
use tracing::trace;

use super::reduce::numeric_values;
use crate::error::{KernelError, Result};
use crate::kernels::sort::{equal_runs, sort_permutation};
use crate::kernels::kernel_column;
use crate::types::{Scalar, SortOrder};

/// Population variance of `values` (divides by n), clamped to be non-negative.
pub(crate) fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squared: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (squared / n).max(0.0)
}

/// Population variance of the non-null values: `E[x²] - (E[x])²`.
///
/// # Errors
///
/// Returns [`KernelError::InsufficientData`] with fewer than two non-null
/// values and [`KernelError::NotImplemented`] for non-numeric columns.
pub fn variance(column: &dyn Array) -> Result<f64> {
    trace!(rows = column.len(), data_type = %column.data_type(), "variance");
    let values = numeric_values(column, "variance")?;
    if values.len() < 2 {
        return Err(KernelError::insufficient("variance", 2, values.len()));
    }
    Ok(population_variance(&values))
}

/// Square root of [`variance`].
///
/// # Errors
///
/// Same as [`variance`].
pub fn standard_deviation(column: &dyn Array) -> Result<f64> {
    Ok(variance(column)?.sqrt())
}

/// Most frequent non-null value.
///
/// Among values sharing the highest count, the one that occurs first in the
/// input wins. An empty or all-null column yields [`Scalar::Null`].
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] for unsupported column types.
pub fn mode(column: &dyn Array) -> Result<Scalar> {
    let values = kernel_column(column, "mode")?;
    let permutation = sort_permutation(column, SortOrder::Ascending, "mode")?;

    // (count, first row) of the current winner.
    let mut best: Option<(usize, usize)> = None;
    for run in equal_runs(column, values, &permutation) {
        // Stable sort: the run's first entry is its earliest row.
        let first = permutation[run.start];
        if column.is_null(first) {
            continue;
        }
        let count = run.len();
        let better = match best {
            None => true,
            Some((best_count, best_first)) => {
                count > best_count || (count == best_count && first < best_first)
            }
        };
        if better {
            best = Some((count, first));
        }
    }
    Ok(best.map_or(Scalar::Null, |(_, row)| values.scalar_at(row)))
}

/// Quantile `q` of the non-null values with linear interpolation.
///
/// Values are sorted ascending and the position `q * (n - 1)` is read,
/// interpolating between neighbours when it is fractional.
///
/// # Errors
///
/// Returns [`KernelError::InvalidArgument`] when `q` is outside `[0, 1]`,
/// [`KernelError::InsufficientData`] when there are no non-null values and
/// [`KernelError::NotImplemented`] for non-numeric columns.
pub fn quantile(column: &dyn Array, q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(KernelError::InvalidArgument(format!(
            "quantile must be within [0, 1], got {q}"
        )));
    }
    let mut values = numeric_values(column, "quantile")?;
    if values.is_empty() {
        return Err(KernelError::insufficient("quantile", 1, 0));
    }
    values.sort_by(f64::total_cmp);

    let position = q * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return Ok(values[lower]);
    }
    let fraction = position - lower as f64;
    Ok(values[lower] + (values[upper] - values[lower]) * fraction)
}

/// Median of the non-null values; `quantile(column, 0.5)`.
///
/// # Errors
///
/// Same as [`quantile`].
pub fn median(column: &dyn Array) -> Result<f64> {
    quantile(column, 0.5)
}
