use thiserror::Error;

/// Common error types used across the dispatch pipeline.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Invalid batch size, wave width, or a duplicate identifier while
    /// building an index. Always detected before any batch is opened.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A work item had no matching record in a required index.
    #[error("No {record} record found for employee {emp_id}")]
    LookupMiss {
        record: &'static str,
        emp_id: String,
    },

    /// Message rendering failed for one item.
    #[error("Render error for employee {emp_id}: {reason}")]
    Render { emp_id: String, reason: String },

    /// A batch flush failed on the backend. Fails that batch only.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DispatchError {
    /// Whether this error is scoped to a single work item.
    ///
    /// Item-scoped errors are collected and surfaced alongside successes;
    /// they never abort the batch they occurred in.
    pub fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            DispatchError::LookupMiss { .. } | DispatchError::Render { .. }
        )
    }
}
