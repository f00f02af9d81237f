//! Caller-side memoization of fetch/aggregate runs.
//!
//! The pipeline itself keeps no state between calls. Callers that refresh
//! periodically hold a [`RefreshGuard`] and skip refetching while the
//! [`QuerySignature`] of their request is unchanged.

use std::collections::BTreeSet;

use crate::analyzers::types::TimeWindow;

/// Identifies a query by its device set and window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySignature {
    device_ids: Vec<i64>,
    start_ms: i64,
    end_ms: i64,
}

impl QuerySignature {
    pub fn new(active: &BTreeSet<i64>, window: &TimeWindow) -> Self {
        Self {
            device_ids: active.iter().copied().collect(),
            start_ms: window.start.timestamp_millis(),
            end_ms: window.end.timestamp_millis(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RefreshGuard {
    last: Option<QuerySignature>,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records `signature` when it differs from the last
    /// one seen.
    pub fn should_refresh(&mut self, signature: &QuerySignature) -> bool {
        if self.last.as_ref() == Some(signature) {
            return false;
        }
        self.last = Some(signature.clone());
        true
    }

    /// Forgets the last signature, e.g. after a failed fetch.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
