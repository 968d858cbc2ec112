//! Configuration types for index administration.

use std::time::Duration;

/// Upper bound for the pause between dropping and recreating an index.
pub const MAX_SETTLE_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the IndexAdmin.
///
/// Controls how long `recreate` waits for the engine to settle after deleting an
/// index, and how many records a single bulk submission may carry.
#[derive(Debug, Clone)]
pub struct IndexAdminConfig {
    /// Pause between delete and create during `recreate`.
    ///
    /// Zero disables the pause. Values above [`MAX_SETTLE_DELAY`] are clamped.
    pub settle_delay: Duration,

    /// Maximum number of records allowed in a single bulk operation.
    ///
    /// Set to `None` to disable the limit (not recommended for production).
    /// Defaults to 1000 if not specified.
    pub max_bulk_operations: Option<usize>,
}

impl Default for IndexAdminConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            max_bulk_operations: Some(1000),
        }
    }
}

impl IndexAdminConfig {
    /// Create a config with no bulk size limit.
    ///
    /// # Warning
    ///
    /// Removing the limit can lead to oversized requests that the engine rejects
    /// or that time out. Not recommended for production.
    pub fn unlimited() -> Self {
        Self {
            max_bulk_operations: None,
            ..Self::default()
        }
    }

    /// Set the settle delay used by `recreate`, clamped to [`MAX_SETTLE_DELAY`].
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay.min(MAX_SETTLE_DELAY);
        self
    }

    /// Set a custom bulk size limit.
    pub fn with_max_bulk_operations(mut self, max_bulk_operations: usize) -> Self {
        self.max_bulk_operations = Some(max_bulk_operations);
        self
    }
}
