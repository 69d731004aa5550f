//! Per-session visit counter surfaced on the landing summary

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Counts landing page visits per session key
#[derive(Clone, Default)]
pub struct VisitCounter {
    counts: Arc<Mutex<HashMap<String, u64>>>,
}

impl VisitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit and return the session's total, this one included
    pub async fn record_visit(&self, session_key: &str) -> u64 {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(session_key.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}
