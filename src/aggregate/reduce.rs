//! Null-skipping reductions: sum, mean, min/max, counts and boolean any/all.

use std::cmp::Ordering;

use arrow::array::{Array, AsArray, PrimitiveArray};
use arrow::datatypes::{ArrowPrimitiveType, DataType};
use tracing::trace;

use crate::error::{KernelError, Result};
use crate::kernels::{downcast_numeric, kernel_column, valid_positions, KernelNative};
use crate::types::Scalar;

fn non_null_f64<T>(arr: &PrimitiveArray<T>) -> Vec<f64>
where
    T: ArrowPrimitiveType,
    T::Native: KernelNative,
{
    arr.iter().flatten().map(KernelNative::to_f64).collect()
}

fn slots_f64<T>(arr: &PrimitiveArray<T>) -> Vec<Option<f64>>
where
    T: ArrowPrimitiveType,
    T::Native: KernelNative,
{
    arr.iter().map(|v| v.map(KernelNative::to_f64)).collect()
}

fn sum_primitive<T>(arr: &PrimitiveArray<T>) -> Result<Scalar>
where
    T: ArrowPrimitiveType,
    T::Native: KernelNative,
{
    T::Native::checked_sum(arr.iter().flatten())
}

/// Non-null values of a numeric column widened to f64, in input order.
pub(crate) fn numeric_values(column: &dyn Array, operation: &'static str) -> Result<Vec<f64>> {
    downcast_numeric!(column, arr => Ok(non_null_f64(arr)),
        other => Err(KernelError::not_implemented(operation, other)),
    )
}

/// Every slot of a numeric column widened to f64, nulls kept as None.
pub(crate) fn numeric_slots(column: &dyn Array, operation: &'static str) -> Result<Vec<Option<f64>>> {
    downcast_numeric!(column, arr => Ok(slots_f64(arr)),
        other => Err(KernelError::not_implemented(operation, other)),
    )
}

fn true_count_i64(count: usize) -> Result<i64> {
    i64::try_from(count)
        .map_err(|_| KernelError::InvalidArgument("count exceeds i64 range".into()))
}

/// Sums the non-null values.
///
/// Signed integers and booleans (`true` = 1) sum to `Int64`, unsigned integers
/// to `UInt64`, floats to `Float64`. An empty or all-null column sums to zero.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] for non-numeric, non-boolean
/// columns and [`KernelError::InvalidArgument`] on integer overflow.
pub fn sum(column: &dyn Array) -> Result<Scalar> {
    trace!(rows = column.len(), data_type = %column.data_type(), "sum");
    downcast_numeric!(column, arr => sum_primitive(arr),
        DataType::Boolean => Ok(Scalar::Int64(true_count_i64(column.as_boolean().true_count())?)),
        other => Err(KernelError::not_implemented("sum", other)),
    )
}

/// Arithmetic mean of the non-null values.
///
/// # Errors
///
/// Returns [`KernelError::InsufficientData`] when there are no non-null
/// values and [`KernelError::NotImplemented`] for non-numeric columns.
pub fn mean(column: &dyn Array) -> Result<f64> {
    let values = numeric_values(column, "mean")?;
    if values.is_empty() {
        return Err(KernelError::insufficient("mean", 1, 0));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn extreme(column: &dyn Array, operation: &'static str, wanted: Ordering) -> Result<Scalar> {
    let values = kernel_column(column, operation)?;
    valid_positions(column)
        .into_iter()
        .reduce(|best, i| {
            if values.compare_at(i, best) == wanted {
                i
            } else {
                best
            }
        })
        .map(|i| values.scalar_at(i))
        .ok_or_else(|| KernelError::insufficient(operation, 1, 0))
}

/// Smallest non-null value, in the column's own type.
///
/// For booleans this is `false` if any `false` is present, else `true`.
///
/// # Errors
///
/// Returns [`KernelError::InsufficientData`] for an empty or all-null column
/// and [`KernelError::NotImplemented`] for unsupported types.
pub fn min(column: &dyn Array) -> Result<Scalar> {
    extreme(column, "min", Ordering::Less)
}

/// Largest non-null value, in the column's own type.
///
/// For booleans this is `true` if any `true` is present, else `false`.
///
/// # Errors
///
/// Returns [`KernelError::InsufficientData`] for an empty or all-null column
/// and [`KernelError::NotImplemented`] for unsupported types.
pub fn max(column: &dyn Array) -> Result<Scalar> {
    extreme(column, "max", Ordering::Greater)
}

/// Number of non-null elements.
///
/// Nulls are counted logically, so an array without a validity buffer,
/// such as a `NullArray`, still reports its nulls.
#[must_use]
pub fn count(column: &dyn Array) -> i64 {
    (column.len() - column.logical_null_count()) as i64
}

/// Alias of [`count`].
#[must_use]
pub fn count_non_null(column: &dyn Array) -> i64 {
    count(column)
}

/// Number of null elements.
#[must_use]
pub fn count_null(column: &dyn Array) -> i64 {
    column.logical_null_count() as i64
}

fn require_bool<'a>(
    column: &'a dyn Array,
    operation: &'static str,
) -> Result<&'a arrow::array::BooleanArray> {
    if column.data_type() != &DataType::Boolean {
        return Err(KernelError::TypeMismatch {
            expected: format!("BOOL for {operation}"),
            actual: column.data_type().to_string(),
        });
    }
    Ok(column.as_boolean())
}

/// True if any non-null value is true. False for an empty column.
///
/// # Errors
///
/// Returns [`KernelError::TypeMismatch`] for non-boolean columns.
pub fn any(column: &dyn Array) -> Result<bool> {
    Ok(require_bool(column, "any")?.true_count() > 0)
}

/// True if every non-null value is true. True for an empty column.
///
/// # Errors
///
/// Returns [`KernelError::TypeMismatch`] for non-boolean columns.
pub fn all(column: &dyn Array) -> Result<bool> {
    Ok(require_bool(column, "all")?.false_count() == 0)
}
