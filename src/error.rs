// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for intranet sessions
//!
//! Every failure of a session operation maps to exactly one variant here.
//! Protocol errors carry the path and status that broke the hop chain.

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for intranet sessions
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failed (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Network failure reported by a transport
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// A 302 arrived without a Location header
    #[error("Missing redirect location in {status} response from {url}")]
    MissingRedirect { url: String, status: u16 },

    /// A hop answered with a status the redirect chain cannot handle
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// The hop budget ran out
    #[error("Too many redirects ({hops}) while resolving {url}")]
    TooManyRedirects { url: String, hops: usize },

    /// Credentials were rejected or the login endpoint misbehaved
    #[error("Login failed: {reason}")]
    LoginFailed {
        reason: String,
        url: Option<String>,
        status: Option<u16>,
    },

    /// Relay page did not contain a usable form
    #[error("Malformed relay page: {reason}")]
    MalformedRelayPage { reason: String, url: Option<String> },

    /// Relay form submission was not answered with a redirect
    #[error("Relay submission to {url} returned {status}")]
    RelaySubmission { url: String, status: u16 },

    /// Wait queue was full when the call was submitted
    #[error("Session queue is full ({max_pending} pending requests)")]
    QueueOverflow { max_pending: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure category, for callers that branch on the kind of error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    MissingRedirect,
    UnexpectedStatus,
    TooManyRedirects,
    LoginFailed,
    MalformedRelayPage,
    RelaySubmission,
    QueueOverflow,
    Config,
}

impl Error {
    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a missing-redirect error
    pub fn missing_redirect(url: impl Into<String>, status: u16) -> Self {
        Error::MissingRedirect {
            url: url.into(),
            status,
        }
    }

    /// Create an unexpected-status error
    pub fn unexpected_status(url: impl Into<String>, status: u16) -> Self {
        Error::UnexpectedStatus {
            url: url.into(),
            status,
        }
    }

    /// Create a too-many-redirects error
    pub fn too_many_redirects(url: impl Into<String>, hops: usize) -> Self {
        Error::TooManyRedirects {
            url: url.into(),
            hops,
        }
    }

    /// Create a login error
    pub fn login_failed(
        reason: impl Into<String>,
        url: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Error::LoginFailed {
            reason: reason.into(),
            url: Some(url.into()),
            status,
        }
    }

    /// Create a malformed relay page error
    pub fn malformed_relay(reason: impl Into<String>) -> Self {
        Error::MalformedRelayPage {
            reason: reason.into(),
            url: None,
        }
    }

    /// Create a relay submission error
    pub fn relay_submission(url: impl Into<String>, status: u16) -> Self {
        Error::RelaySubmission {
            url: url.into(),
            status,
        }
    }

    /// Attach the page URL to a relay page error
    pub fn with_url(mut self, page_url: impl Into<String>) -> Self {
        match self {
            Error::MalformedRelayPage { ref mut url, .. }
            | Error::LoginFailed { ref mut url, .. }
            | Error::Timeout { ref mut url, .. } => *url = Some(page_url.into()),
            _ => {}
        }
        self
    }

    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_) | Error::Network(_) | Error::Timeout { .. } => ErrorKind::Network,
            Error::MissingRedirect { .. } => ErrorKind::MissingRedirect,
            Error::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            Error::TooManyRedirects { .. } => ErrorKind::TooManyRedirects,
            Error::LoginFailed { .. } => ErrorKind::LoginFailed,
            Error::MalformedRelayPage { .. } => ErrorKind::MalformedRelayPage,
            Error::RelaySubmission { .. } => ErrorKind::RelaySubmission,
            Error::QueueOverflow { .. } => ErrorKind::QueueOverflow,
            Error::Url(_) | Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// Check if the redirect chain itself was violated
    pub fn is_protocol(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingRedirect | ErrorKind::UnexpectedStatus | ErrorKind::TooManyRedirects
        )
    }

    /// Check if the gateway's relay contract was broken
    pub fn is_relay(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedRelayPage | ErrorKind::RelaySubmission
        )
    }

    /// Check if the credentials were rejected
    pub fn is_login_failure(&self) -> bool {
        self.kind() == ErrorKind::LoginFailed
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::MissingRedirect { status, .. }
            | Error::UnexpectedStatus { status, .. }
            | Error::RelaySubmission { status, .. } => Some(*status),
            Error::LoginFailed { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::MissingRedirect { url, .. }
            | Error::UnexpectedStatus { url, .. }
            | Error::TooManyRedirects { url, .. }
            | Error::RelaySubmission { url, .. } => Some(url),
            Error::LoginFailed { url: Some(u), .. }
            | Error::MalformedRelayPage { url: Some(u), .. }
            | Error::Timeout { url: Some(u), .. } => Some(u),
            _ => None,
        }
    }
}
