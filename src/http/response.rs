// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;

use super::headers;

/// Response of a single transport call, body already decoded
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded response body
    pub body: String,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl TransportResponse {
    /// Create a new response
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            response_time_ms: 0,
        }
    }

    /// Create a response from a raw status code
    ///
    /// Out-of-range codes become 500.
    pub fn with_status(status: u16) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, HeaderMap::new(), String::new())
    }

    /// Add a header, builder style
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Replace the body, builder style
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Check for 200 OK
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Check for 302 Found
    pub fn is_found(&self) -> bool {
        self.status == StatusCode::FOUND
    }

    /// Get a header value
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Redirect target, if any
    pub fn location(&self) -> Option<&str> {
        self.header_value(headers::LOCATION)
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all(headers::SET_COOKIE)
    }
}
