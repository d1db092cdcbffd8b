//! Ordering and arithmetic capabilities of the native numeric types.

use std::cmp::Ordering;

use crate::error::{KernelError, Result};
use crate::types::{ColumnType, Scalar};

/// Native value of a numeric column the kernels know how to order, sum and
/// convert.
pub trait KernelNative: Copy + Send + Sync + 'static {
    /// Column type tag of this native type.
    const COLUMN_TYPE: ColumnType;

    /// Total ordering. Floats use IEEE total order so NaN has a stable place.
    fn total_cmp(self, other: Self) -> Ordering;

    /// Lossy widening conversion used by the statistical reductions.
    fn to_f64(self) -> f64;

    /// Wraps the value in its [`Scalar`] variant.
    fn into_scalar(self) -> Scalar;

    /// Sums values in the widest type of the same family.
    ///
    /// Signed integers accumulate into `Int64`, unsigned into `UInt64`, floats
    /// into `Float64`. Integer overflow is an error.
    fn checked_sum<I: Iterator<Item = Self>>(values: I) -> Result<Scalar>;
}

fn sum_overflow(target: &str) -> KernelError {
    KernelError::InvalidArgument(format!("sum overflows {target}"))
}

macro_rules! signed_native {
    ($($native:ty => $variant:ident),* $(,)?) => {$(
        impl KernelNative for $native {
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn total_cmp(self, other: Self) -> Ordering {
                self.cmp(&other)
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn checked_sum<I: Iterator<Item = Self>>(mut values: I) -> Result<Scalar> {
                values
                    .try_fold(0i64, |acc, v| acc.checked_add(i64::from(v)))
                    .map(Scalar::Int64)
                    .ok_or_else(|| sum_overflow("INT64"))
            }
        }
    )*};
}

macro_rules! unsigned_native {
    ($($native:ty => $variant:ident),* $(,)?) => {$(
        impl KernelNative for $native {
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn total_cmp(self, other: Self) -> Ordering {
                self.cmp(&other)
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn checked_sum<I: Iterator<Item = Self>>(mut values: I) -> Result<Scalar> {
                values
                    .try_fold(0u64, |acc, v| acc.checked_add(u64::from(v)))
                    .map(Scalar::UInt64)
                    .ok_or_else(|| sum_overflow("UINT64"))
            }
        }
    )*};
}

macro_rules! float_native {
    ($($native:ty => $variant:ident),* $(,)?) => {$(
        impl KernelNative for $native {
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;

            fn total_cmp(self, other: Self) -> Ordering {
                <$native>::total_cmp(&self, &other)
            }

            fn to_f64(self) -> f64 {
                f64::from(self)
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn checked_sum<I: Iterator<Item = Self>>(values: I) -> Result<Scalar> {
                // Positive zero for an empty input.
                Ok(Scalar::Float64(values.fold(0.0, |acc, v| acc + f64::from(v))))
            }
        }
    )*};
}

signed_native!(i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64);
unsigned_native!(u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64);
float_native!(f32 => Float32, f64 => Float64);
