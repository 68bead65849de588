// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for intranet sessions
//!
//! A redirect-free transport, an in-memory cookie store, and the request
//! and response types the session state machine passes around.

mod client;
mod cookie;
mod request;
mod response;

pub use client::{HttpClientConfig, HttpTransport, Transport};
pub use cookie::{Cookie, CookieStore, DELETED_MARKER};
pub use request::{Endpoint, FormFields};
pub use response::TransportResponse;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const ACCEPT_LANGUAGE: &str = "accept-language";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const LOCATION: &str = "location";
    pub const SET_COOKIE: &str = "set-cookie";
}
