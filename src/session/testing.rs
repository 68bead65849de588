// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scripted transport for session tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::http::{Endpoint, FormFields, Transport, TransportResponse};

pub(crate) const HOST: &str = "intranet.example.com";

/// One call seen by the transport
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: String,
    pub endpoint: Endpoint,
    pub cookie: String,
    pub fields: Option<FormFields>,
}

/// Answers each (method, host, path) from a script
///
/// The n-th call to a route gets the n-th scripted response; once the
/// script runs out the last response repeats. Unscripted routes answer 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<(String, String, String), Vec<TransportResponse>>>,
    seen: Mutex<HashMap<(String, String, String), usize>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every response for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append a response to the route's script
    pub fn on(&self, method: &str, host: &str, path: &str, response: TransportResponse) {
        self.routes
            .lock()
            .entry(key(method, host, path))
            .or_default()
            .push(response);
    }

    /// Script a GET that answers 302 to `location`
    pub fn redirect(&self, host: &str, path: &str, location: &str) {
        self.on(
            "GET",
            host,
            path,
            TransportResponse::with_status(302).header("location", location),
        );
    }

    /// Every call so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls with the given method and path, in order
    pub fn calls_to(&self, method: &str, path: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method && c.endpoint.path == path)
            .cloned()
            .collect()
    }

    /// Most calls that were ever in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(
        &self,
        method: &str,
        endpoint: &Endpoint,
        cookie: &str,
        fields: Option<&FormFields>,
    ) -> Result<TransportResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            endpoint: endpoint.clone(),
            cookie: cookie.to_string(),
            fields: fields.cloned(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let route = key(method, &endpoint.host, &endpoint.path);
        let response = {
            let mut seen = self.seen.lock();
            let count = seen.entry(route.clone()).or_insert(0);
            let index = *count;
            *count += 1;

            self.routes
                .lock()
                .get(&route)
                .and_then(|script| script.get(index).or_else(|| script.last()))
                .cloned()
                .unwrap_or_else(|| TransportResponse::with_status(404))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(response)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, endpoint: &Endpoint, cookie_header: &str) -> Result<TransportResponse> {
        self.answer("GET", endpoint, cookie_header, None).await
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        cookie_header: &str,
        fields: &FormFields,
    ) -> Result<TransportResponse> {
        self.answer("POST", endpoint, cookie_header, Some(fields)).await
    }
}

/// An auto-submitting relay page posting `fields` to `action`
pub(crate) fn relay_page(action: &str, fields: &[(&str, &str)]) -> String {
    let inputs: String = fields
        .iter()
        .map(|(name, value)| format!(r#"<input type="hidden" name="{}" value="{}">"#, name, value))
        .collect();
    format!(
        r#"<html><body onload="document.forms[0].submit()"><form method="post" action="{}">{}<noscript><input type="submit" value="Continue"></noscript></form></body></html>"#,
        action, inputs
    )
}

fn key(method: &str, host: &str, path: &str) -> (String, String, String) {
    (method.to_string(), host.to_string(), path.to_string())
}
