// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory cookie store scoped by domain and path

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Value gateways use to tell the client a cookie is gone
pub const DELETED_MARKER: &str = "deleted";

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to (lowercase, no leading dot)
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Set without a Domain attribute: only the exact host matches
    pub host_only: bool,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
    /// The directive removes the cookie instead of storing it
    pub deleted: bool,
}

impl Cookie {
    /// Create a new host-only session cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            deleted: value == DELETED_MARKER,
            value,
            domain: String::new(),
            path: "/".to_string(),
            host_only: true,
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain; the cookie also matches subdomains
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = normalize_domain(&domain.into());
        self.host_only = false;
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be dropped rather than sent
    pub fn is_dead(&self) -> bool {
        self.deleted || self.is_expired()
    }

    /// Check if the cookie applies to `host` and `path`
    pub fn matches(&self, host: &str, path: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };

        domain_ok && path_matches(strip_query(path), &self.path) && !self.is_dead()
    }

    /// Same (name, domain, path) scope as `other`
    fn same_scope(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    /// Parse a Set-Cookie header received from `host` for `path`
    ///
    /// Missing Domain/Path attributes default to the request's host and
    /// path (query removed). A Domain attribute that does not cover `host` rejects the
    /// cookie.
    pub fn parse(header: &str, host: &str, path: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let host = host.to_ascii_lowercase();
        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));
        cookie.domain = host.clone();
        cookie.path = default_path(path);

        let mut max_age = None;

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_ascii_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" if !val.is_empty() => {
                        cookie.domain = normalize_domain(val);
                        cookie.host_only = false;
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" => {
                        if let Some(dt) = parse_cookie_date(val) {
                            cookie.expires = Some(dt);
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            max_age = Some(secs);
                        }
                    }
                    _ => {}
                }
            } else {
                match part.to_ascii_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        // Max-Age wins over Expires
        if let Some(secs) = max_age {
            cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
            if secs <= 0 {
                cookie.deleted = true;
            }
        }
        if cookie.is_expired() {
            cookie.deleted = true;
        }

        if !cookie.host_only && !domain_matches(&host, &cookie.domain) {
            return None;
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Cookie storage for one session
///
/// Rendering keeps insertion order. Replacing a cookie keeps its position.
#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    cookies: Arc<RwLock<Vec<Cookie>>>,
}

impl CookieStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cookie, or remove its scope if it is a deletion
    pub fn add(&self, cookie: Cookie) {
        let mut cookies = self.cookies.write();
        let existing = cookies.iter().position(|c| c.same_scope(&cookie));

        match (existing, cookie.is_dead()) {
            (Some(idx), true) => {
                cookies.remove(idx);
            }
            (Some(idx), false) => cookies[idx] = cookie,
            (None, true) => {}
            (None, false) => cookies.push(cookie),
        }
    }

    /// Apply the Set-Cookie lines of a response received from `host`/`path`
    pub fn absorb<'a>(
        &self,
        set_cookie_headers: impl IntoIterator<Item = &'a str>,
        host: &str,
        path: &str,
    ) {
        let host = strip_port(host);
        for header in set_cookie_headers {
            match Cookie::parse(header, host, path) {
                Some(cookie) => {
                    tracing::trace!(
                        name = %cookie.name,
                        domain = %cookie.domain,
                        path = %cookie.path,
                        deleted = cookie.deleted,
                        "Set-Cookie"
                    );
                    self.add(cookie);
                }
                None => tracing::debug!(host, "Ignoring malformed Set-Cookie"),
            }
        }
    }

    /// Cookie header value for a request to `host`/`path`
    ///
    /// Returns an empty string when nothing matches.
    pub fn cookies_for(&self, host: &str, path: &str) -> String {
        self.purge();

        let host = strip_port(host);
        self.cookies
            .read()
            .iter()
            .filter(|c| c.matches(host, path))
            .map(|c| c.to_header_value())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Drop deleted and expired cookies
    pub fn purge(&self) {
        let mut cookies = self.cookies.write();
        if cookies.iter().any(Cookie::is_dead) {
            cookies.retain(|c| !c.is_dead());
        }
    }

    /// First live cookie with the given name
    pub fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .read()
            .iter()
            .find(|c| c.name == name && !c.is_dead())
            .cloned()
    }

    /// Snapshot of all stored cookies
    pub fn cookies(&self) -> Vec<Cookie> {
        self.cookies.read().clone()
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        self.cookies
            .write()
            .retain(|c| c.name != name || c.domain != domain || c.path != path);
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.write().clear();
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.read().len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export all cookies as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.cookies.read())
    }
}

fn normalize_domain(domain: &str) -> String {
    domain.trim_start_matches('.').to_ascii_lowercase()
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

/// Plain prefix match: `/app` also covers `/application`
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    request_path.starts_with(cookie_path)
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// Request path without its query, `/` when empty or relative
fn default_path(request_path: &str) -> String {
    let path = strip_query(request_path);
    if path.starts_with('/') {
        path.to_string()
    } else {
        "/".to_string()
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or(host)
}

fn parse_cookie_date(val: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(val, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc())
}
