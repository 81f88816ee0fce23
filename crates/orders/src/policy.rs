//! Order lifecycle policy.

use serde::{Deserialize, Serialize};

/// Deployment-configurable rules for order handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPolicy {
    /// Length of the lock window opened at placement.
    pub lock_window_hours: i64,
    /// Counter used by the sequential fallback allocator.
    pub counter_name: String,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            lock_window_hours: 48,
            counter_name: "ordered_counter".to_string(),
        }
    }
}
