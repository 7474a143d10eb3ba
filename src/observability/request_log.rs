//! Bounded in-memory request history.
//!
//! # Design Decisions
//! - `VecDeque` gives O(1) append and O(1) eviction of the oldest entry
//! - Append and trim happen under a single lock acquisition
//! - A poisoned lock is recovered rather than propagated: history is
//!   best-effort and must never take a request down with it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Immutable record of one completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub ip: String,
    pub status: u16,
    /// Wall duration in milliseconds, two decimal places.
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
}

/// FIFO ring of the most recent `LogEntry` values.
#[derive(Debug)]
pub struct RequestLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    default_limit: usize,
}

impl RequestLog {
    /// Create a history holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize, default_limit: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            default_limit: default_limit.clamp(1, capacity),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry, evicting the oldest ones past capacity.
    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Most recent entries first.
    ///
    /// `limit` defaults to the configured default and is clamped to
    /// `[1, capacity]`.
    pub fn recent(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let limit = self.clamp_limit(limit);
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Look up a retained entry.
    pub fn get(&self, id: Uuid) -> Option<LogEntry> {
        self.lock().iter().rev().find(|e| e.id == id).cloned()
    }

    pub fn clamp_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.default_limit).clamp(1, self.capacity)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            time: Utc::now(),
            method: "GET".to_string(),
            url: format!("/r/{n}"),
            ip: "127.0.0.1".to_string(),
            status: 200,
            duration_ms: 0.5,
            request_body: None,
        }
    }

    fn urls(entries: &[LogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.url.clone()).collect()
    }

    #[test]
    fn length_is_min_of_pushes_and_capacity() {
        for n in [0, 1, 5, 10, 11, 40] {
            let log = RequestLog::new(10, 5);
            for i in 0..n {
                log.push(entry(i));
                assert!(log.len() <= log.capacity());
            }
            assert_eq!(log.len(), n.min(10));
        }
    }

    #[test]
    fn eviction_keeps_latest_in_arrival_order() {
        let log = RequestLog::new(200, 50);
        for i in 1..=250 {
            log.push(entry(i));
        }

        let recent = log.recent(Some(200));
        assert_eq!(recent.len(), 200);
        let expected: Vec<_> = (51..=250).rev().map(|i| format!("/r/{i}")).collect();
        assert_eq!(urls(&recent), expected);
    }

    #[test]
    fn recent_limit_defaults_and_clamps() {
        let log = RequestLog::new(20, 5);
        for i in 0..30 {
            log.push(entry(i));
        }
        assert_eq!(log.recent(None).len(), 5);
        assert_eq!(log.recent(Some(0)).len(), 1);
        assert_eq!(log.recent(Some(3)).len(), 3);
        assert_eq!(log.recent(Some(1000)).len(), 20);
        assert_eq!(log.recent(Some(1))[0].url, "/r/29");
    }

    #[test]
    fn recent_on_short_buffer_returns_everything() {
        let log = RequestLog::new(200, 50);
        log.push(entry(1));
        log.push(entry(2));
        assert_eq!(urls(&log.recent(Some(50))), vec!["/r/2", "/r/1"]);
    }

    #[test]
    fn lookup_by_id() {
        let log = RequestLog::new(2, 2);
        let first = entry(1);
        let first_id = first.id;
        log.push(first);
        assert_eq!(log.get(first_id).unwrap().url, "/r/1");

        log.push(entry(2));
        log.push(entry(3));
        assert!(log.get(first_id).is_none());
        assert!(log.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn entry_json_uses_camel_case_and_omits_empty_body() {
        let value = serde_json::to_value(entry(1)).unwrap();
        assert!(value.get("durationMs").is_some());
        assert!(value.get("requestBody").is_none());
    }

    #[test]
    fn concurrent_pushes_respect_capacity() {
        let log = std::sync::Arc::new(RequestLog::new(64, 10));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        log.push(entry(t * 100 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.len(), 64);
    }
}
