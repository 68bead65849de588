// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP transport implementation

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};

use super::request::{Endpoint, FormFields};
use super::response::TransportResponse;
use super::{headers, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};

/// One request/response exchange with a gateway host
///
/// Implementations never follow redirects and never keep cookies: the
/// caller passes the rendered `Cookie` header in and reads `Set-Cookie`
/// from the returned headers. An empty cookie header means "send none".
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET and return the decoded body
    async fn get(&self, endpoint: &Endpoint, cookie_header: &str) -> Result<TransportResponse>;

    /// Issue a urlencoded form POST
    async fn post(
        &self,
        endpoint: &Endpoint,
        cookie_header: &str,
        fields: &FormFields,
    ) -> Result<TransportResponse>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// URL scheme used for every endpoint
    pub scheme: String,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Default headers
    pub default_headers: HeaderMap,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            headers::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            headers::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
            scheme: "https".to_string(),
            proxy: None,
            default_headers,
        }
    }
}

impl HttpClientConfig {
    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set URL scheme
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Accept invalid certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

/// reqwest-backed transport
///
/// Response bodies are decoded according to `Content-Encoding`
/// (identity, gzip, deflate, br) before they are returned.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: HttpClientConfig,
}

impl HttpTransport {
    /// Create a new transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new transport with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone())
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get transport configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &Endpoint,
        cookie_header: &str,
        fields: Option<&FormFields>,
    ) -> Result<TransportResponse> {
        let start = Instant::now();
        let url = endpoint.to_url(&self.config.scheme)?;

        tracing::debug!(method = %method, host = %endpoint.host, path = %endpoint.path, "Request");

        let mut builder = self.client.request(method.clone(), url);

        if !cookie_header.is_empty() {
            builder = builder.header(headers::COOKIE, cookie_header);
        }

        if let Some(fields) = fields {
            let body = fields.to_body();
            builder = builder
                .header(headers::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e, endpoint))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(e, endpoint))?;

        let response_time_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            method = %method,
            host = %endpoint.host,
            path = %endpoint.path,
            status = status.as_u16(),
            time_ms = response_time_ms,
            "Response"
        );

        let mut response =
            TransportResponse::new(status, headers, String::from_utf8_lossy(&body).into_owned());
        response.response_time_ms = response_time_ms;
        Ok(response)
    }

    fn map_error(&self, err: reqwest::Error, endpoint: &Endpoint) -> Error {
        if err.is_timeout() {
            Error::timeout_with_url(
                "HTTP request",
                self.config.timeout.as_millis() as u64,
                endpoint.to_string(),
            )
        } else if err.is_connect() {
            Error::network(format!("could not connect to {}: {}", endpoint.host, err))
        } else {
            Error::Http(err)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: &Endpoint, cookie_header: &str) -> Result<TransportResponse> {
        self.execute(Method::GET, endpoint, cookie_header, None).await
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        cookie_header: &str,
        fields: &FormFields,
    ) -> Result<TransportResponse> {
        self.execute(Method::POST, endpoint, cookie_header, Some(fields))
            .await
    }
}
