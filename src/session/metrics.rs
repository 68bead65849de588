// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session metrics
//!
//! Counters for what the session did on the wire and in the state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Latencies kept for percentile calculation
const MAX_LATENCIES: usize = 10_000;

/// Session metrics collector
#[derive(Debug)]
pub struct SessionMetrics {
    operations: AtomicU64,
    operations_failed: AtomicU64,
    queue_rejections: AtomicU64,
    requests: AtomicU64,
    hops: AtomicU64,
    logins: AtomicU64,
    relays: AtomicU64,
    logout_confirmations: AtomicU64,
    total_operation_ms: AtomicU64,
    start_time: Instant,
    request_latencies: RwLock<Vec<u64>>,
}

/// Metrics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Operations that got the slot
    pub operations: u64,
    /// Operations that ended in an error
    pub operations_failed: u64,
    /// Calls rejected because the queue was full
    pub queue_rejections: u64,
    /// Transport calls issued
    pub requests: u64,
    /// Redirects followed
    pub hops: u64,
    /// Credential submissions
    pub logins: u64,
    /// Relay forms submitted
    pub relays: u64,
    /// Logout confirmations acknowledged
    pub logout_confirmations: u64,
    /// Average operation time (ms)
    pub avg_operation_ms: f64,
    /// Request latency percentiles
    pub latency_p50_ms: u64,
    pub latency_p95_ms: u64,
    pub latency_p99_ms: u64,
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            operations: AtomicU64::new(0),
            operations_failed: AtomicU64::new(0),
            queue_rejections: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            hops: AtomicU64::new(0),
            logins: AtomicU64::new(0),
            relays: AtomicU64::new(0),
            logout_confirmations: AtomicU64::new(0),
            total_operation_ms: AtomicU64::new(0),
            start_time: Instant::now(),
            request_latencies: RwLock::new(Vec::new()),
        }
    }

    /// Record a finished operation
    pub fn record_operation(&self, duration_ms: u64, success: bool) {
        self.operations.fetch_add(1, Ordering::Relaxed);
        self.total_operation_ms.fetch_add(duration_ms, Ordering::Relaxed);
        if !success {
            self.operations_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a call rejected by the gate
    pub fn record_queue_rejection(&self) {
        self.queue_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transport call
    pub fn record_request(&self, latency_ms: u64) {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let mut latencies = self.request_latencies.write();
        latencies.push(latency_ms);
        if latencies.len() > MAX_LATENCIES {
            latencies.drain(0..MAX_LATENCIES / 2);
        }
    }

    /// Record a followed redirect
    pub fn record_hop(&self) {
        self.hops.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a credential submission
    pub fn record_login(&self) {
        self.logins.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a relay form submission
    pub fn record_relay(&self) {
        self.relays.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a logout confirmation
    pub fn record_logout_confirmation(&self) {
        self.logout_confirmations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current report
    pub fn report(&self) -> MetricsReport {
        let operations = self.operations.load(Ordering::Relaxed);
        let total_ms = self.total_operation_ms.load(Ordering::Relaxed);

        let avg_operation_ms = if operations > 0 {
            total_ms as f64 / operations as f64
        } else {
            0.0
        };

        let (p50, p95, p99) = {
            let latencies = self.request_latencies.read();
            (
                percentile(&latencies, 50),
                percentile(&latencies, 95),
                percentile(&latencies, 99),
            )
        };

        MetricsReport {
            uptime_secs: self.start_time.elapsed().as_secs(),
            operations,
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
            queue_rejections: self.queue_rejections.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            hops: self.hops.load(Ordering::Relaxed),
            logins: self.logins.load(Ordering::Relaxed),
            relays: self.relays.load(Ordering::Relaxed),
            logout_confirmations: self.logout_confirmations.load(Ordering::Relaxed),
            avg_operation_ms,
            latency_p50_ms: p50,
            latency_p95_ms: p95,
            latency_p99_ms: p99,
        }
    }
}

/// Nearest-rank percentile
fn percentile(latencies: &[u64], pct: usize) -> u64 {
    if latencies.is_empty() {
        return 0;
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();

    let rank = (pct * sorted.len() + 99) / 100;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
