//! Lock-free request counters surfaced through the health report.

use crate::artifact::Mode;
use crate::engine::{Label, ResultSet};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters, updated on the request path without locks.
#[derive(Debug, Default)]
pub struct ServiceStats {
    batch_requests: AtomicU64,
    record_requests: AtomicU64,
    rows_classified: AtomicU64,
    confirmed_planets: AtomicU64,
    false_positives: AtomicU64,
    failed_requests: AtomicU64,
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub batch_requests: u64,
    pub record_requests: u64,
    pub rows_classified: u64,
    pub confirmed_planets: u64,
    pub false_positives: u64,
    pub failed_requests: u64,
}

impl ServiceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, mode: Mode) {
        match mode {
            Mode::Full => self.batch_requests.fetch_add(1, Ordering::Relaxed),
            Mode::Reduced => self.record_requests.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_results(&self, results: &ResultSet) {
        self.rows_classified
            .fetch_add(results.len() as u64, Ordering::Relaxed);
        for row in results.rows() {
            match row.label() {
                Label::ConfirmedPlanet => {
                    self.confirmed_planets.fetch_add(1, Ordering::Relaxed)
                }
                Label::FalsePositive => self.false_positives.fetch_add(1, Ordering::Relaxed),
            };
        }
    }

    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            batch_requests: self.batch_requests.load(Ordering::Relaxed),
            record_requests: self.record_requests.load(Ordering::Relaxed),
            rows_classified: self.rows_classified.load(Ordering::Relaxed),
            confirmed_planets: self.confirmed_planets.load(Ordering::Relaxed),
            false_positives: self.false_positives.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
        }
    }
}
