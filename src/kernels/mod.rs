//! Compute kernels over Arrow arrays.
//!
//! Every kernel resolves its input through [`kernel_column`], the single place
//! where Arrow data types are mapped onto typed implementations. Numeric
//! columns share one generic implementation instantiated per
//! [`KernelNative`] type; booleans and UTF-8 strings get their own.

pub mod distinct;
pub mod filter;
mod native;
pub mod sort;
pub mod take;

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, PrimitiveArray, StringArray};
use arrow::datatypes::{ArrowPrimitiveType, DataType};

use crate::error::{KernelError, Result};
use crate::types::Scalar;

pub use distinct::{count_values, unique_values};
pub use filter::{filter, filter_batch, SelectionVector};
pub use native::KernelNative;
pub use sort::{nth_element, rank, rank_average, sort, sort_batch, sort_indices};
pub use take::{take, take_batch};

/// Expands `$body` once per numeric Arrow type with `$arr` bound to the
/// downcast `PrimitiveArray`. Remaining match arms are passed through as-is.
macro_rules! downcast_numeric {
    ($array:expr, $arr:ident => $body:expr, $($rest:tt)*) => {{
        use ::arrow::array::AsArray as _;
        use ::arrow::datatypes as adt;
        let array: &dyn ::arrow::array::Array = $array;
        match array.data_type() {
            adt::DataType::Int8 => { let $arr = array.as_primitive::<adt::Int8Type>(); $body }
            adt::DataType::Int16 => { let $arr = array.as_primitive::<adt::Int16Type>(); $body }
            adt::DataType::Int32 => { let $arr = array.as_primitive::<adt::Int32Type>(); $body }
            adt::DataType::Int64 => { let $arr = array.as_primitive::<adt::Int64Type>(); $body }
            adt::DataType::UInt8 => { let $arr = array.as_primitive::<adt::UInt8Type>(); $body }
            adt::DataType::UInt16 => { let $arr = array.as_primitive::<adt::UInt16Type>(); $body }
            adt::DataType::UInt32 => { let $arr = array.as_primitive::<adt::UInt32Type>(); $body }
            adt::DataType::UInt64 => { let $arr = array.as_primitive::<adt::UInt64Type>(); $body }
            adt::DataType::Float32 => { let $arr = array.as_primitive::<adt::Float32Type>(); $body }
            adt::DataType::Float64 => { let $arr = array.as_primitive::<adt::Float64Type>(); $body }
            $($rest)*
        }
    }};
}

pub(crate) use downcast_numeric;

/// Type-erased view of a supported column.
///
/// Positions passed to [`compare_at`](KernelColumn::compare_at) and
/// [`scalar_at`](KernelColumn::scalar_at) must be in bounds; null handling is
/// the caller's job.
pub(crate) trait KernelColumn {
    /// Natural ordering of the values at `i` and `j`, both non-null.
    fn compare_at(&self, i: usize, j: usize) -> Ordering;

    /// Value at `i` as a scalar, [`Scalar::Null`] when the slot is null.
    fn scalar_at(&self, i: usize) -> Scalar;

    /// Builds a new array of the same type from the given positions.
    fn gather(&self, positions: &[usize]) -> ArrayRef;
}

impl<T> KernelColumn for PrimitiveArray<T>
where
    T: ArrowPrimitiveType,
    T::Native: KernelNative,
{
    fn compare_at(&self, i: usize, j: usize) -> Ordering {
        KernelNative::total_cmp(self.value(i), self.value(j))
    }

    fn scalar_at(&self, i: usize) -> Scalar {
        if self.is_null(i) {
            Scalar::Null
        } else {
            self.value(i).into_scalar()
        }
    }

    fn gather(&self, positions: &[usize]) -> ArrayRef {
        let out: PrimitiveArray<T> = positions
            .iter()
            .map(|&i| self.is_valid(i).then(|| self.value(i)))
            .collect();
        Arc::new(out)
    }
}

impl KernelColumn for BooleanArray {
    fn compare_at(&self, i: usize, j: usize) -> Ordering {
        self.value(i).cmp(&self.value(j))
    }

    fn scalar_at(&self, i: usize) -> Scalar {
        if self.is_null(i) {
            Scalar::Null
        } else {
            Scalar::Bool(self.value(i))
        }
    }

    fn gather(&self, positions: &[usize]) -> ArrayRef {
        let out: BooleanArray = positions
            .iter()
            .map(|&i| self.is_valid(i).then(|| self.value(i)))
            .collect();
        Arc::new(out)
    }
}

impl KernelColumn for StringArray {
    fn compare_at(&self, i: usize, j: usize) -> Ordering {
        self.value(i).cmp(self.value(j))
    }

    fn scalar_at(&self, i: usize) -> Scalar {
        if self.is_null(i) {
            Scalar::Null
        } else {
            Scalar::String(self.value(i).to_string())
        }
    }

    fn gather(&self, positions: &[usize]) -> ArrayRef {
        let out: StringArray = positions
            .iter()
            .map(|&i| self.is_valid(i).then(|| self.value(i)))
            .collect();
        Arc::new(out)
    }
}

/// Resolves a column to its typed kernel implementation.
///
/// # Errors
///
/// Returns [`KernelError::NotImplemented`] naming `operation` when the
/// column's Arrow type is outside the supported set.
pub(crate) fn kernel_column<'a>(
    array: &'a dyn Array,
    operation: &'static str,
) -> Result<&'a dyn KernelColumn> {
    downcast_numeric!(array, arr => Ok(arr as &dyn KernelColumn),
        DataType::Boolean => Ok(array.as_boolean() as &dyn KernelColumn),
        DataType::Utf8 => Ok(array.as_string::<i32>() as &dyn KernelColumn),
        other => Err(KernelError::not_implemented(operation, other)),
    )
}

/// Positions of the non-null slots of `array`, in order.
pub(crate) fn valid_positions(array: &dyn Array) -> Vec<usize> {
    (0..array.len()).filter(|&i| array.is_valid(i)).collect()
}
