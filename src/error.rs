//! Error types for colkit kernel operations.

use arrow::datatypes::DataType as ArrowDataType;
use arrow::error::ArrowError;
use thiserror::Error;

/// Result type alias using [`KernelError`].
pub type Result<T> = std::result::Result<T, KernelError>;

/// Error types for colkit kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The kernel has no implementation for the column's data type.
    #[error("{operation} not implemented for type {data_type}")]
    NotImplemented {
        operation: &'static str,
        data_type: String,
    },

    /// Argument outside its accepted domain (quantile, threshold, null index, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Index or rank outside `[0, len)`.
    #[error("Index out of bounds: {index} (length {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    /// Not enough non-null values to produce a defined result.
    #[error("{operation} requires at least {required} non-null value(s), got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// Column name absent from the batch schema.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Mask or index length disagrees with the target.
    #[error("Shape mismatch: expected length {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Operation applied to a column of the wrong type.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Caller-requested cancellation observed between units of work.
    #[error("Operation cancelled")]
    Cancelled,

    /// Error raised by the underlying Arrow library.
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl KernelError {
    /// Builds a [`KernelError::NotImplemented`] naming the offending Arrow type.
    #[must_use]
    pub fn not_implemented(operation: &'static str, data_type: &ArrowDataType) -> Self {
        KernelError::NotImplemented {
            operation,
            data_type: data_type.to_string(),
        }
    }

    /// Builds a [`KernelError::InsufficientData`].
    #[must_use]
    pub fn insufficient(operation: &'static str, required: usize, actual: usize) -> Self {
        KernelError::InsufficientData {
            operation,
            required,
            actual,
        }
    }
}
