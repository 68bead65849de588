// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Authenticated session against an SSO gateway

use std::sync::Arc;
use std::time::Instant;

use super::config::SessionConfig;
use super::gate::SessionGate;
use super::metrics::{MetricsReport, SessionMetrics};
use super::resolver::{FetchResult, RedirectResolver};
use crate::error::{Error, Result};
use crate::http::{CookieStore, Endpoint, HttpTransport, Transport};

/// One credential, one cookie store, one operation at a time
///
/// Every public operation waits for the session's single slot, so a login
/// or relay exchange in progress never interleaves with another caller's
/// requests. Callers queue in arrival order.
pub struct IntranetSession {
    /// Session configuration
    config: SessionConfig,
    /// Wire access
    transport: Arc<dyn Transport>,
    /// Cookies shared by every operation
    cookies: CookieStore,
    /// Concurrency slot and wait queue
    gate: SessionGate,
    /// Counters
    metrics: Arc<SessionMetrics>,
}

impl IntranetSession {
    /// Create a session talking HTTP through reqwest
    pub fn new(config: SessionConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(config.http.clone())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a session over a custom transport
    pub fn with_transport(config: SessionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            host = %config.host,
            username = %config.credentials.username,
            max_hops = config.max_hops,
            "Session created"
        );

        Ok(Self {
            gate: SessionGate::new(config.max_pending),
            config,
            transport,
            cookies: CookieStore::new(),
            metrics: Arc::new(SessionMetrics::new()),
        })
    }

    /// Fetch `path` from the gateway host, authenticating as needed
    pub async fn get(&self, path: &str) -> Result<FetchResult> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        self.gate.run(self.resolve(&path)).await.map_err(|e| {
            if matches!(e, Error::QueueOverflow { .. }) {
                self.metrics.record_queue_rejection();
                tracing::warn!(path = %path, error = %e, "Rejected");
            }
            e
        })
    }

    /// Run one operation; the caller holds the slot
    async fn resolve(&self, path: &str) -> Result<FetchResult> {
        let start = Instant::now();
        let mut resolver = RedirectResolver::new(
            self.transport.as_ref(),
            &self.cookies,
            &self.config,
            &self.metrics,
        );
        let result = resolver
            .fetch(Endpoint::new(self.config.host.as_str(), path))
            .await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        self.metrics.record_operation(elapsed_ms, result.is_ok());
        match &result {
            Ok(fetched) => tracing::info!(
                path,
                status = fetched.status_code,
                hops = resolver.hops(),
                time_ms = elapsed_ms,
                "Fetched"
            ),
            Err(e) => tracing::warn!(
                path,
                kind = ?e.kind(),
                hops = resolver.hops(),
                error = %e,
                "Fetch failed"
            ),
        }

        result
    }

    /// Log out by fetching the logout path
    pub async fn logout(&self) -> Result<FetchResult> {
        self.get(&self.config.logout_path).await
    }

    /// Bound the wait queue; callers beyond it fail with `QueueOverflow`
    pub fn set_max_pending_requests(&self, max: usize) {
        self.gate.set_max_pending(Some(max));
    }

    /// Callers waiting for the slot
    pub fn pending_requests(&self) -> usize {
        self.gate.pending()
    }

    /// Check if an operation is in progress
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Session cookies
    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Metrics report
    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}

impl std::fmt::Debug for IntranetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntranetSession")
            .field("config", &self.config)
            .field("cookies", &self.cookies.len())
            .field("gate", &self.gate)
            .finish()
    }
}
