//! Record batch wrapper with lazy row selection.

use std::borrow::Cow;
use std::cmp::Ordering;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use tracing::trace;

use crate::aggregate::{aggregate_column, Aggregator};
use crate::error::{KernelError, Result};
use crate::group_by::{group_by, GroupByResult};
use crate::kernels::filter::SelectionVector;
use crate::kernels::kernel_column;
use crate::kernels::sort::sort_batch;
use crate::kernels::take::gather_batch;
use crate::types::{Scalar, SortOrder};

/// Looks up a column by name. The first field with that name wins.
///
/// # Errors
///
/// Returns [`KernelError::ColumnNotFound`] if no field has that name.
pub fn column_by_name<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .schema_ref()
        .index_of(name)
        .map(|i| batch.column(i))
        .map_err(|_| KernelError::ColumnNotFound(name.to_string()))
}

/// Row test applied by [`ColumnBatch::filter_rows_by_column`].
///
/// A null cell never matches. Numeric values compare across types through
/// `f64`; any other type mismatch never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCondition {
    GreaterThan(Scalar),
    LessThan(Scalar),
    Equal(Scalar),
    /// Inclusive on both ends.
    Between(Scalar, Scalar),
}

impl RowCondition {
    /// Returns true if `value` satisfies the condition.
    #[must_use]
    pub fn matches(&self, value: &Scalar) -> bool {
        match self {
            RowCondition::GreaterThan(bound) => compare(value, bound).is_some_and(Ordering::is_gt),
            RowCondition::LessThan(bound) => compare(value, bound).is_some_and(Ordering::is_lt),
            RowCondition::Equal(bound) => compare(value, bound).is_some_and(Ordering::is_eq),
            RowCondition::Between(lower, upper) => {
                compare(value, lower).is_some_and(Ordering::is_ge)
                    && compare(value, upper).is_some_and(Ordering::is_le)
            }
        }
    }
}

fn compare(value: &Scalar, bound: &Scalar) -> Option<Ordering> {
    let (lhs, rhs) = (value.column_type()?, bound.column_type()?);
    if lhs == rhs {
        Some(value.total_cmp(bound))
    } else if lhs.is_numeric() && rhs.is_numeric() {
        Some(value.as_f64()?.total_cmp(&bound.as_f64()?))
    } else {
        None
    }
}

/// Wrapper around a [`RecordBatch`] with an optional selection vector.
///
/// Filtering only narrows the selection; rows are gathered when
/// [`materialize`](Self::materialize) runs or an operation needs them.
#[derive(Debug, Clone)]
pub struct ColumnBatch {
    batch: RecordBatch,
    selection: Option<SelectionVector>,
}

impl ColumnBatch {
    /// Wraps `batch` with every row selected.
    #[must_use]
    pub fn new(batch: RecordBatch) -> Self {
        ColumnBatch {
            batch,
            selection: None,
        }
    }

    /// Wraps `batch` keeping only the rows in `selection`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::IndexOutOfBounds`] if a selected index is not a
    /// row of `batch`.
    pub fn with_selection(batch: RecordBatch, selection: SelectionVector) -> Result<Self> {
        let len = batch.num_rows();
        if let Some(&bad) = selection.indices.iter().find(|&&i| i >= len) {
            return Err(KernelError::IndexOutOfBounds {
                index: i64::try_from(bad).unwrap_or(i64::MAX),
                len,
            });
        }
        Ok(ColumnBatch {
            batch,
            selection: Some(selection),
        })
    }

    /// Returns the underlying batch, ignoring any selection.
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Current selection, or None when every row is visible.
    #[must_use]
    pub fn selection(&self) -> Option<&SelectionVector> {
        self.selection.as_ref()
    }

    /// Schema of the underlying batch.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Number of visible rows: the selection size if one is set.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.selection
            .as_ref()
            .map_or_else(|| self.batch.num_rows(), SelectionVector::len)
    }

    /// Number of columns; selection does not affect it.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Field names in schema order, duplicates included.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Returns an unselected column by name.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ColumnNotFound`] for an unknown name.
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        column_by_name(&self.batch, name)
    }

    /// Returns an unselected column by position.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::IndexOutOfBounds`] past the last column.
    pub fn column_by_index(&self, index: usize) -> Result<&ArrayRef> {
        let len = self.batch.num_columns();
        if index >= len {
            return Err(KernelError::IndexOutOfBounds {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            });
        }
        Ok(self.batch.column(index))
    }

    /// Narrows the selection to the visible rows where `mask` is true.
    ///
    /// The mask is aligned with the visible rows, not the underlying batch.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ShapeMismatch`] if the mask length differs from
    /// [`num_rows`](Self::num_rows).
    pub fn filter_by_mask(&self, mask: &BooleanArray) -> Result<Self> {
        let local = SelectionVector::from_mask(mask, self.num_rows())?;
        Ok(self.narrow(local.indices, "filter_by_mask"))
    }

    /// Narrows the selection to the visible rows for which `predicate`
    /// returns true. The predicate receives visible positions `0..num_rows`.
    #[must_use]
    pub fn filter_rows(&self, predicate: impl Fn(usize) -> bool) -> Self {
        let local = (0..self.num_rows()).filter(|&pos| predicate(pos)).collect();
        self.narrow(local, "filter_rows")
    }

    /// Narrows the selection to the visible rows whose value in column
    /// `name` satisfies `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::ColumnNotFound`] for an unknown name and
    /// [`KernelError::NotImplemented`] for an unsupported column type.
    pub fn filter_rows_by_column(&self, name: &str, condition: &RowCondition) -> Result<Self> {
        let values = kernel_column(self.column(name)?.as_ref(), "filter_rows")?;
        Ok(self.filter_rows(|pos| {
            let row = self.selection.as_ref().map_or(Some(pos), |s| s.get(pos));
            row.is_some_and(|row| condition.matches(&values.scalar_at(row)))
        }))
    }

    /// Maps positions among the visible rows onto the underlying batch.
    fn narrow(&self, local: Vec<usize>, operation: &'static str) -> Self {
        let indices: Vec<usize> = match &self.selection {
            Some(current) => local.iter().filter_map(|&pos| current.get(pos)).collect(),
            None => local,
        };
        trace!(
            visible = self.num_rows(),
            selected = indices.len(),
            operation,
            "narrow selection"
        );
        ColumnBatch {
            batch: self.batch.clone(),
            selection: Some(SelectionVector::new(indices)),
        }
    }

    /// Gathers the selected rows into a new batch.
    ///
    /// If there's no selection vector, returns the batch unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::NotImplemented`] if a column type cannot be
    /// gathered.
    pub fn materialize(&self) -> Result<RecordBatch> {
        Ok(self.visible()?.into_owned())
    }

    fn visible(&self) -> Result<Cow<'_, RecordBatch>> {
        match &self.selection {
            Some(selection) => Ok(Cow::Owned(gather_batch(
                &self.batch,
                &selection.indices,
                "materialize",
            )?)),
            None => Ok(Cow::Borrowed(&self.batch)),
        }
    }

    /// Sorts the visible rows by `name`.
    ///
    /// # Errors
    ///
    /// See [`sort_batch`].
    pub fn sort_by(&self, name: &str, order: SortOrder) -> Result<Self> {
        let visible = self.visible()?;
        Ok(ColumnBatch::new(sort_batch(&visible, name, order)?))
    }

    /// Aggregates the visible rows of column `name`.
    ///
    /// # Errors
    ///
    /// See [`aggregate_column`].
    pub fn aggregate(&self, name: &str, aggregator: &dyn Aggregator) -> Result<Scalar> {
        let visible = self.visible()?;
        aggregate_column(&visible, name, aggregator)
    }

    /// Groups the visible rows.
    ///
    /// # Errors
    ///
    /// See [`group_by`].
    pub fn group_by(
        &self,
        key_columns: &[&str],
        aggregations: &[(&str, &dyn Aggregator)],
    ) -> Result<GroupByResult> {
        let visible = self.visible()?;
        group_by(&visible, key_columns, aggregations)
    }
}

impl From<RecordBatch> for ColumnBatch {
    fn from(batch: RecordBatch) -> Self {
        ColumnBatch::new(batch)
    }
}
