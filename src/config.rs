//! Kernel configuration and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Order in which group-by emits its groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupOrder {
    /// Groups appear in the order their first row appears in the batch.
    #[default]
    FirstSeen,
    /// Groups are sorted by key tuple, nulls first, each key ascending.
    SortedByKey,
}

/// Shared flag a caller flips to stop a long multi-group computation.
///
/// Kernels check it between independent units of work (for example between
/// groups), never inside a single column reduction.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Configuration for multi-step kernels such as group-by.
#[derive(Debug, Clone, Default)]
pub struct KernelConfig {
    /// Output order of groups.
    pub group_order: GroupOrder,
    /// Optional cancellation signal checked between groups.
    pub cancellation: Option<CancellationToken>,
}

impl KernelConfig {
    /// Creates a new kernel configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group output order.
    #[must_use]
    pub fn with_group_order(mut self, group_order: GroupOrder) -> Self {
        self.group_order = group_order;
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns true if an attached token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KernelConfig::default();
        assert_eq!(config.group_order, GroupOrder::FirstSeen);
        assert!(!config.is_cancelled());
    }

    #[test]
    fn test_cancellation_shared_between_clones() {
        let token = CancellationToken::new();
        let config = KernelConfig::new().with_cancellation(token.clone());
        assert!(!config.is_cancelled());
        token.cancel();
        assert!(config.is_cancelled());
    }
}
