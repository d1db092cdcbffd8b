//! colkit - columnar compute kernels over Apache Arrow.
//!
//! Order-preserving sort, gather, mask filtering, distinct values,
//! null-aware aggregation and hash group-by over Arrow arrays and record
//! batches. Every call is synchronous and returns freshly allocated output.
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{Float64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use colkit::{group_by, Aggregation};
//!
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("category", DataType::Utf8, false),
//!     Field::new("score", DataType::Float64, false),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(StringArray::from(vec!["A", "B", "A", "B"])),
//!         Arc::new(Float64Array::from(vec![70.0, 90.0, 90.0, 70.0])),
//!     ],
//! )?;
//! let result = group_by(&batch, &["category"], &[("score", &Aggregation::Mean)])?;
//! assert_eq!(result.num_groups(), 2);
//! # Ok::<(), colkit::KernelError>(())
//! ```

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod error;
pub mod group_by;
pub mod kernels;
pub mod types;

pub use aggregate::{aggregate_column, detect_anomalies, Aggregation, Aggregator, AnomalyResult, FnAggregator};
pub use batch::{column_by_name, ColumnBatch, RowCondition};
pub use config::{CancellationToken, GroupOrder, KernelConfig};
pub use error::{KernelError, Result};
pub use group_by::{group_by, group_by_with_config, GroupByResult, GroupKey};
pub use kernels::{
    count_values, filter, filter_batch, nth_element, rank, rank_average, sort, sort_batch,
    sort_indices, take, take_batch, unique_values, SelectionVector,
};
pub use types::{ColumnType, Scalar, SortOrder};
