// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session configuration

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;

/// Path the gateway redirects to when it wants credentials
pub const DEFAULT_LOGIN_PATH: &str = "/my.policy";
/// Path that starts a logout
pub const DEFAULT_LOGOUT_PATH: &str = "/Shibboleth.sso/Logout";
/// Prefix of the identity provider's logout confirmation page
pub const DEFAULT_LOGOUT_CONFIRM_PREFIX: &str = "/idp/profile/Logout";
/// Value of the `vhost` field posted with the credentials
pub const DEFAULT_LOGIN_VHOST: &str = "standard";
/// Redirects followed per operation before giving up
pub const DEFAULT_MAX_HOPS: usize = 10;

/// Username and password for the gateway login form
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username
    pub username: String,
    password: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Password
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Gateway host (authority) every `get` path is relative to
    pub host: String,
    /// Login credentials
    pub credentials: Credentials,
    /// Login prompt path
    pub login_path: String,
    /// Path fetched by `logout()`
    pub logout_path: String,
    /// Prefix of logout confirmation pages
    pub logout_confirm_prefix: String,
    /// `vhost` value posted with the credentials
    pub login_vhost: String,
    /// GET the login page before posting credentials
    pub prefetch_login_page: bool,
    /// Redirects followed per operation
    pub max_hops: usize,
    /// Timeout for each transport call
    pub timeout: Duration,
    /// Wait queue bound (None = unbounded)
    pub max_pending: Option<usize>,
    /// Transport configuration
    pub http: HttpClientConfig,
}

impl SessionConfig {
    /// Create a config for `host` with the given credentials
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let timeout = Duration::from_secs(30);
        Self {
            host: host.into(),
            credentials: Credentials::new(username, password),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            logout_confirm_prefix: DEFAULT_LOGOUT_CONFIRM_PREFIX.to_string(),
            login_vhost: DEFAULT_LOGIN_VHOST.to_string(),
            prefetch_login_page: false,
            max_hops: DEFAULT_MAX_HOPS,
            timeout,
            max_pending: None,
            http: HttpClientConfig::default().timeout(timeout),
        }
    }

    /// Read the config from `INTRANET_*` environment variables
    ///
    /// Requires `INTRANET_HOST`, `INTRANET_USERNAME` and `INTRANET_PASSWORD`.
    /// `INTRANET_MAX_HOPS`, `INTRANET_TIMEOUT_SECS`, `INTRANET_MAX_PENDING`
    /// and `INTRANET_INSECURE` are optional.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
        };
        let mut config = Self::new(
            var("INTRANET_HOST")?,
            var("INTRANET_USERNAME")?,
            var("INTRANET_PASSWORD")?,
        );

        if let Ok(hops) = std::env::var("INTRANET_MAX_HOPS") {
            config.max_hops = parse_env("INTRANET_MAX_HOPS", &hops)?;
        }
        if let Ok(secs) = std::env::var("INTRANET_TIMEOUT_SECS") {
            let secs = parse_env("INTRANET_TIMEOUT_SECS", &secs)?;
            config = config.timeout(Duration::from_secs(secs));
        }
        if let Ok(pending) = std::env::var("INTRANET_MAX_PENDING") {
            config.max_pending = Some(parse_env("INTRANET_MAX_PENDING", &pending)?);
        }
        if let Ok(insecure) = std::env::var("INTRANET_INSECURE") {
            config.http.accept_invalid_certs = matches!(insecure.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the config for values the session cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".into()));
        }
        if self.max_hops == 0 {
            return Err(Error::Config("max_hops must be at least 1".into()));
        }
        if !self.login_path.starts_with('/') || !self.logout_path.starts_with('/') {
            return Err(Error::Config("login and logout paths must be absolute".into()));
        }
        Ok(())
    }

    /// Set the login prompt path
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set the logout path
    pub fn logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    /// Set the logout confirmation prefix
    pub fn logout_confirm_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.logout_confirm_prefix = prefix.into();
        self
    }

    /// GET the login page before posting credentials
    pub fn prefetch_login_page(mut self, prefetch: bool) -> Self {
        self.prefetch_login_page = prefetch;
        self
    }

    /// Set the hop budget
    pub fn max_hops(mut self, hops: usize) -> Self {
        self.max_hops = hops;
        self
    }

    /// Set the per-call timeout (also applied to the HTTP client)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.http.timeout = timeout;
        self
    }

    /// Bound the wait queue
    pub fn max_pending(mut self, max: usize) -> Self {
        self.max_pending = Some(max);
        self
    }

    /// Set URL scheme (`https` unless testing)
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.http.scheme = scheme.into();
        self
    }

    /// Replace the transport configuration
    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, value)))
}
