//! Group keys and first-seen bucketing.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::kernels::KernelColumn;
use crate::types::Scalar;

/// One row's values across the key columns, compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(pub Vec<Scalar>);

impl GroupKey {
    /// Reads the key of `row` from the resolved key columns.
    pub(crate) fn from_row(columns: &[&dyn KernelColumn], row: usize) -> Self {
        GroupKey(columns.iter().map(|c| c.scalar_at(row)).collect())
    }

    /// Lexicographic order over the key values; nulls sort first.
    #[must_use]
    pub fn total_cmp(&self, other: &GroupKey) -> Ordering {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.total_cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| self.0.len().cmp(&other.0.len()))
    }
}

/// Rows of one group, in input order.
#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub(crate) key: GroupKey,
    pub(crate) rows: Vec<usize>,
}

impl Group {
    /// The row the group's key values are read from.
    pub(crate) fn first_row(&self) -> usize {
        self.rows[0]
    }
}

/// Buckets rows by key, remembering the order groups are first seen.
#[derive(Debug, Default)]
pub(crate) struct GroupTable {
    slots: HashMap<GroupKey, usize>,
    groups: Vec<Group>,
}

impl GroupTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: GroupKey, row: usize) {
        match self.slots.get(&key) {
            Some(&slot) => self.groups[slot].rows.push(row),
            None => {
                self.slots.insert(key.clone(), self.groups.len());
                self.groups.push(Group {
                    key,
                    rows: vec![row],
                });
            }
        }
    }

    /// Consumes the table, yielding groups in first-seen order.
    pub(crate) fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}
