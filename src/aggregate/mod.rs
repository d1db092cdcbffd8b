//! Null-aware aggregation over single columns.
//!
//! The free functions are the kernels; [`Aggregation`] names them so they can
//! be passed around, and [`Aggregator`] is the seam group-by calls through, so
//! callers can plug in their own reductions with [`FnAggregator`].

mod anomaly;
mod reduce;
mod stats;

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::batch::column_by_name;
use crate::error::Result;
use crate::types::Scalar;

pub use anomaly::{detect_anomalies, AnomalyResult};
pub use reduce::{all, any, count, count_non_null, count_null, max, mean, min, sum};
pub use stats::{median, mode, quantile, standard_deviation, variance};

/// Built-in aggregation operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    /// [`sum`]
    Sum,
    /// [`mean`]
    Mean,
    /// [`min`]
    Min,
    /// [`max`]
    Max,
    /// [`variance`]
    Variance,
    /// [`standard_deviation`]
    StandardDeviation,
    /// [`count`]
    Count,
    /// [`count_null`]
    CountNull,
    /// [`mode`]
    Mode,
    /// [`median`]
    Median,
    /// [`quantile`] at the given fraction.
    Quantile(f64),
    /// [`any`]
    Any,
    /// [`all`]
    All,
}

impl Aggregation {
    /// Returns the lowercase operator name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Variance => "variance",
            Aggregation::StandardDeviation => "stddev",
            Aggregation::Count => "count",
            Aggregation::CountNull => "count_null",
            Aggregation::Mode => "mode",
            Aggregation::Median => "median",
            Aggregation::Quantile(_) => "quantile",
            Aggregation::Any => "any",
            Aggregation::All => "all",
        }
    }

    /// Runs the operator over `column`.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying kernel.
    pub fn apply(&self, column: &dyn Array) -> Result<Scalar> {
        Ok(match self {
            Aggregation::Sum => sum(column)?,
            Aggregation::Mean => Scalar::Float64(mean(column)?),
            Aggregation::Min => min(column)?,
            Aggregation::Max => max(column)?,
            Aggregation::Variance => Scalar::Float64(variance(column)?),
            Aggregation::StandardDeviation => Scalar::Float64(standard_deviation(column)?),
            Aggregation::Count => Scalar::Int64(count(column)),
            Aggregation::CountNull => Scalar::Int64(count_null(column)),
            Aggregation::Mode => mode(column)?,
            Aggregation::Median => Scalar::Float64(median(column)?),
            Aggregation::Quantile(q) => Scalar::Float64(quantile(column, *q)?),
            Aggregation::Any => Scalar::Bool(any(column)?),
            Aggregation::All => Scalar::Bool(all(column)?),
        })
    }
}

/// A reduction from a column to a single scalar.
pub trait Aggregator {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Reduces `column` to one value.
    ///
    /// # Errors
    ///
    /// Implementation-defined; kernel errors are propagated unchanged.
    fn aggregate(&self, column: &dyn Array) -> Result<Scalar>;
}

impl Aggregator for Aggregation {
    fn name(&self) -> &str {
        Aggregation::name(self)
    }

    fn aggregate(&self, column: &dyn Array) -> Result<Scalar> {
        self.apply(column)
    }
}

/// Adapts a closure into an [`Aggregator`].
pub struct FnAggregator<F> {
    name: String,
    func: F,
}

impl<F> FnAggregator<F>
where
    F: Fn(&dyn Array) -> Result<Scalar>,
{
    /// Wraps `func` under `name`.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Aggregator for FnAggregator<F>
where
    F: Fn(&dyn Array) -> Result<Scalar>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn aggregate(&self, column: &dyn Array) -> Result<Scalar> {
        (self.func)(column)
    }
}

/// Applies `aggregator` to the column of `batch` named `name`.
///
/// # Errors
///
/// Returns [`KernelError::ColumnNotFound`](crate::KernelError::ColumnNotFound)
/// for an unknown column and propagates aggregator errors.
pub fn aggregate_column(
    batch: &RecordBatch,
    name: &str,
    aggregator: &dyn Aggregator,
) -> Result<Scalar> {
    let column = column_by_name(batch, name)?;
    aggregator.aggregate(column.as_ref())
}
