//! Hash group-by over record batches.
//!
//! Rows are bucketed by the structural tuple of their key values, so a null
//! key is its own group and never collides with a value that happens to
//! render the same. Each aggregation then runs once per group on the
//! gathered rows of its value column.

mod key;
mod result;

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::record_batch::RecordBatch;
use tracing::{debug, trace, warn};

use crate::aggregate::Aggregator;
use crate::batch::column_by_name;
use crate::config::{GroupOrder, KernelConfig};
use crate::error::{KernelError, Result};
use crate::kernels::{kernel_column, KernelColumn};

pub use key::GroupKey;
pub use result::{GroupByResult, AGGREGATE_SUFFIX};

use key::{Group, GroupTable};

/// Groups `batch` by `key_columns` and applies one aggregator per value
/// column, with the default [`KernelConfig`].
///
/// # Errors
///
/// See [`group_by_with_config`].
pub fn group_by(
    batch: &RecordBatch,
    key_columns: &[&str],
    aggregations: &[(&str, &dyn Aggregator)],
) -> Result<GroupByResult> {
    group_by_with_config(batch, key_columns, aggregations, &KernelConfig::default())
}

/// Groups `batch` by `key_columns` and applies one aggregator per value
/// column.
///
/// Groups come out in first-seen order unless the config asks for
/// [`GroupOrder::SortedByKey`]. Every aggregate result is coerced to `f64`:
/// booleans become 0/1, numeric strings are parsed and a null result
/// becomes a null slot.
///
/// # Errors
///
/// - [`KernelError::InvalidArgument`] when no key column is given or a
///   value column is aggregated twice.
/// - [`KernelError::ColumnNotFound`] for any unknown column name.
/// - [`KernelError::NotImplemented`] for a key column of unsupported type.
/// - [`KernelError::TypeMismatch`] when an aggregate result is not numeric.
/// - [`KernelError::Cancelled`] once the config's token is cancelled.
/// - Any error returned by an aggregator, unchanged.
pub fn group_by_with_config(
    batch: &RecordBatch,
    key_columns: &[&str],
    aggregations: &[(&str, &dyn Aggregator)],
    config: &KernelConfig,
) -> Result<GroupByResult> {
    if key_columns.is_empty() {
        return Err(KernelError::InvalidArgument(
            "group_by needs at least one key column".into(),
        ));
    }

    let keys = key_columns
        .iter()
        .map(|&name| column_by_name(batch, name))
        .collect::<Result<Vec<_>>>()?;
    let key_views = keys
        .iter()
        .map(|column| kernel_column(column.as_ref(), "group_by"))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let values = aggregations
        .iter()
        .map(|&(name, aggregator)| {
            if !seen.insert(name) {
                return Err(KernelError::InvalidArgument(format!(
                    "column {name} is aggregated more than once"
                )));
            }
            let column = column_by_name(batch, name)?;
            let view = kernel_column(column.as_ref(), "group_by")?;
            Ok((name, view, aggregator))
        })
        .collect::<Result<Vec<_>>>()?;

    trace!(
        rows = batch.num_rows(),
        keys = key_columns.len(),
        aggregations = aggregations.len(),
        "group_by"
    );

    let mut table = GroupTable::new();
    for row in 0..batch.num_rows() {
        table.insert(GroupKey::from_row(&key_views, row), row);
    }
    let mut groups = table.into_groups();
    if config.group_order == GroupOrder::SortedByKey {
        groups.sort_by(|a, b| a.key.total_cmp(&b.key));
    }

    let mut slots: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(groups.len()); values.len()];
    for group in &groups {
        if config.is_cancelled() {
            warn!(
                groups = groups.len(),
                completed = slots.first().map_or(0, Vec::len),
                "group_by cancelled"
            );
            return Err(KernelError::Cancelled);
        }
        for ((name, view, aggregator), out) in values.iter().zip(slots.iter_mut()) {
            out.push(aggregate_group(group, name, *view, *aggregator)?);
        }
    }

    let first_rows: Vec<usize> = groups.iter().map(Group::first_row).collect();
    let key_columns = key_columns
        .iter()
        .zip(&key_views)
        .map(|(&name, view)| (name.to_string(), view.gather(&first_rows)))
        .collect();
    let aggregate_columns = values
        .iter()
        .zip(slots)
        .map(|(&(name, _, _), slots)| {
            (
                name.to_string(),
                Arc::new(Float64Array::from(slots)) as ArrayRef,
            )
        })
        .collect();

    debug!(
        rows = batch.num_rows(),
        groups = groups.len(),
        aggregations = aggregations.len(),
        order = ?config.group_order,
        "group_by complete"
    );
    Ok(GroupByResult {
        key_columns,
        aggregate_columns,
    })
}

fn aggregate_group(
    group: &Group,
    name: &str,
    values: &dyn KernelColumn,
    aggregator: &dyn Aggregator,
) -> Result<Option<f64>> {
    let rows = values.gather(&group.rows);
    let scalar = aggregator.aggregate(rows.as_ref())?;
    if scalar.is_null() {
        return Ok(None);
    }
    scalar
        .as_f64()
        .map(Some)
        .ok_or_else(|| KernelError::TypeMismatch {
            expected: format!("numeric result from {} on {name}", aggregator.name()),
            actual: scalar.to_string(),
        })
}
