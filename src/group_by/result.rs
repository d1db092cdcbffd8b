//! Output of a group-by.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{KernelError, Result};

/// Suffix appended to value column names in [`GroupByResult::to_batch`].
pub const AGGREGATE_SUFFIX: &str = "_agg";

/// One row per group: key arrays in their source type, one `Float64`
/// array per aggregated column.
#[derive(Debug, Clone)]
pub struct GroupByResult {
    /// Key columns in the order they were requested.
    pub key_columns: Vec<(String, ArrayRef)>,
    /// Aggregate columns, named after the value column they reduce.
    pub aggregate_columns: Vec<(String, ArrayRef)>,
}

impl GroupByResult {
    /// Number of groups.
    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.key_columns
            .first()
            .or(self.aggregate_columns.first())
            .map_or(0, |(_, array)| array.len())
    }

    /// Key array for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ColumnNotFound`] if `name` was not a key column.
    pub fn key_column(&self, name: &str) -> Result<&ArrayRef> {
        find(&self.key_columns, name)
    }

    /// Aggregate array computed from value column `name`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ColumnNotFound`] if `name` was not aggregated.
    pub fn aggregate_column(&self, name: &str) -> Result<&ArrayRef> {
        find(&self.aggregate_columns, name)
    }

    /// Converts to a record batch: keys first, then `{column}_agg` fields.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::Arrow`] if Arrow rejects the assembled batch.
    pub fn to_batch(&self) -> Result<RecordBatch> {
        let keys = self
            .key_columns
            .iter()
            .map(|(name, array)| (name.clone(), array));
        let aggregates = self
            .aggregate_columns
            .iter()
            .map(|(name, array)| (format!("{name}{AGGREGATE_SUFFIX}"), array));

        let (fields, columns): (Vec<Field>, Vec<ArrayRef>) = keys
            .chain(aggregates)
            .map(|(name, array)| {
                (
                    Field::new(name, array.data_type().clone(), true),
                    Arc::clone(array),
                )
            })
            .unzip();

        let options = RecordBatchOptions::new().with_row_count(Some(self.num_groups()));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &options,
        )?)
    }
}

fn find<'a>(columns: &'a [(String, ArrayRef)], name: &str) -> Result<&'a ArrayRef> {
    columns
        .iter()
        .find(|(column, _)| column == name)
        .map(|(_, array)| array)
        .ok_or_else(|| KernelError::ColumnNotFound(name.to_string()))
}
