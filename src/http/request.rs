// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request addressing and form bodies

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Host and path of a single hop
///
/// `host` is an authority (`name` or `name:port`), `path` keeps its query
/// string verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Authority of the target
    pub host: String,
    /// Path including any query string
    pub path: String,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Resolve a `Location` header value seen while talking to `current_host`
    ///
    /// Absolute URLs carry their own host and path. Anything else keeps the
    /// current host and uses the header value as the path, unchanged.
    pub fn from_location(current_host: &str, location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if url.host_str().is_some() => Self::from_url(&url),
            _ => Self::new(current_host, location),
        }
    }

    /// Build an endpoint from an absolute URL
    pub fn from_url(url: &Url) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(port)) => format!("{}:{}", h, port),
            (Some(h), None) => h.to_string(),
            (None, _) => String::new(),
        };

        let path = match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        };

        Self { host, path }
    }

    /// Host name without the port
    pub fn hostname(&self) -> &str {
        if self.host.starts_with('[') {
            return match self.host.find(']') {
                Some(end) => &self.host[..=end],
                None => &self.host,
            };
        }
        match self.host.split_once(':') {
            Some((name, _)) => name,
            None => &self.host,
        }
    }

    /// Path with the query string removed
    pub fn path_only(&self) -> &str {
        match self.path.split_once('?') {
            Some((p, _)) => p,
            None => &self.path,
        }
    }

    /// Full URL for this endpoint under `scheme`
    pub fn to_url(&self, scheme: &str) -> Result<Url> {
        let url = if self.path.starts_with('/') {
            format!("{}://{}{}", scheme, self.host, self.path)
        } else {
            format!("{}://{}/{}", scheme, self.host, self.path)
        };
        Ok(Url::parse(&url)?)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.host, self.path)
    }
}

/// Ordered form fields, encoded as `application/x-www-form-urlencoded`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    fields: Vec<(String, String)>,
}

impl FormFields {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Append a field, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// First value for a field name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Field names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as a urlencoded string
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Encode as a request body
    pub fn to_body(&self) -> Bytes {
        Bytes::from(self.encode())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
