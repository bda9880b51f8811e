use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the friendship service.
///
/// Passed explicitly at construction; the service reads no global state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Deadline for every individual store call, in milliseconds.
    pub store_timeout_ms: u64,
    /// Accept requests inside a store transaction when the backend offers one.
    /// When `false`, or when the backend has no transactions, acceptance
    /// runs as a sequence of single-document writes.
    pub use_transactions: bool,
    /// Extra attempts for each friend-edge write in the sequential path.
    pub edge_retry_attempts: u32,
    /// Pause between friend-edge retries, in milliseconds.
    pub edge_retry_backoff_ms: u64,
    /// Largest page size a listing may request.
    pub max_page_size: u64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: 5_000,
            use_transactions: true,
            edge_retry_attempts: 2,
            edge_retry_backoff_ms: 50,
            max_page_size: 100,
        }
    }
}

impl SocialConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn edge_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.edge_retry_backoff_ms)
    }

    /// Configuration that always takes the sequential acceptance path.
    pub fn sequential() -> Self {
        Self {
            use_transactions: false,
            ..Default::default()
        }
    }
}
