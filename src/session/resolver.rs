// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect resolution state machine
//!
//! Drives one operation from its first response to a final result. Every
//! redirect is classified as a login prompt, a logout confirmation, a relay
//! page or a plain hop, and the matching exchange is run against the
//! transport. Cookies are read from and written to the session store at
//! each transport call.
//!
//! ```text
//! FOLLOWING --Location == login path--------> LOGIN_PROMPT --302--> FOLLOWING (after login)
//! FOLLOWING --Location starts with prefix---> LOGOUT_CONFIRM --any--> FINAL
//! FOLLOWING --GET 200, relay leg------------> RELAY --302--> FOLLOWING (final leg)
//! FOLLOWING --GET 200, final leg------------> FINAL
//! FOLLOWING --GET 302-----------------------> FOLLOWING
//! ```

use std::future::Future;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::config::SessionConfig;
use super::form::RelayForm;
use super::metrics::SessionMetrics;
use crate::error::{Error, Result};
use crate::http::{CookieStore, Endpoint, FormFields, Transport, TransportResponse};

/// Outcome of a successful operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Path of the hop that produced the body
    pub path: String,
    /// Status of that hop
    pub status_code: u16,
    /// Decoded body
    pub body: String,
}

/// How a 200 on the current redirect chain is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Nothing submitted yet: a 200 is a relay page
    Initial,
    /// Credentials accepted: a 200 is a relay page only if it looks like one
    AfterLogin,
    /// Relay submitted: a 200 is the resource
    Final,
}

/// States of the resolver; failure is the `Err` side of each step
#[derive(Debug)]
pub enum HopState {
    /// Follow the `Location` of `response`, received from `from`
    Following {
        from: Endpoint,
        response: TransportResponse,
        leg: Leg,
    },
    /// Post credentials to `endpoint`
    LoginPrompt { endpoint: Endpoint },
    /// Submit `form`, found on `page`
    Relay { page: Endpoint, form: RelayForm },
    /// Acknowledge the identity provider's logout page at `endpoint`
    LogoutConfirm { endpoint: Endpoint },
    /// Done
    Final(FetchResult),
}

impl HopState {
    /// State name for logs
    pub fn name(&self) -> &'static str {
        match self {
            HopState::Following { .. } => "following",
            HopState::LoginPrompt { .. } => "login_prompt",
            HopState::Relay { .. } => "relay",
            HopState::LogoutConfirm { .. } => "logout_confirm",
            HopState::Final(_) => "final",
        }
    }
}

/// Resolves one operation; lives only as long as the operation holds the slot
pub struct RedirectResolver<'a> {
    transport: &'a dyn Transport,
    cookies: &'a CookieStore,
    config: &'a SessionConfig,
    metrics: &'a SessionMetrics,
    /// Redirects followed so far
    hops: usize,
    /// Credentials were already posted in this operation
    logged_in: bool,
}

impl<'a> RedirectResolver<'a> {
    /// Create a resolver over the session's collaborators
    pub fn new(
        transport: &'a dyn Transport,
        cookies: &'a CookieStore,
        config: &'a SessionConfig,
        metrics: &'a SessionMetrics,
    ) -> Self {
        Self {
            transport,
            cookies,
            config,
            metrics,
            hops: 0,
            logged_in: false,
        }
    }

    /// Redirects followed so far
    pub fn hops(&self) -> usize {
        self.hops
    }

    /// GET `endpoint`, then resolve the redirect chain if it answers 302
    pub async fn fetch(&mut self, endpoint: Endpoint) -> Result<FetchResult> {
        let response = self.get(&endpoint).await?;

        match response.status_code() {
            200 => Ok(FetchResult {
                path: endpoint.path,
                status_code: 200,
                body: response.body,
            }),
            302 => self.resolve(endpoint, response).await,
            status => Err(Error::unexpected_status(endpoint.to_string(), status)),
        }
    }

    /// Run the state machine from a 302 `response` received from `origin`
    pub async fn resolve(
        &mut self,
        origin: Endpoint,
        response: TransportResponse,
    ) -> Result<FetchResult> {
        let mut state = HopState::Following {
            from: origin,
            response,
            leg: Leg::Initial,
        };

        loop {
            state = match state {
                HopState::Following {
                    from,
                    response,
                    leg,
                } => self.follow(from, response, leg).await?,
                HopState::LoginPrompt { endpoint } => self.login(endpoint).await?,
                HopState::Relay { page, form } => self.relay(page, form).await?,
                HopState::LogoutConfirm { endpoint } => self.confirm_logout(endpoint).await?,
                HopState::Final(result) => return Ok(result),
            };
            tracing::trace!(state = state.name(), hop = self.hops, "Transition");
        }
    }

    async fn follow(
        &mut self,
        from: Endpoint,
        response: TransportResponse,
        leg: Leg,
    ) -> Result<HopState> {
        let location = response
            .location()
            .ok_or_else(|| Error::missing_redirect(from.to_string(), response.status_code()))?;
        let next = Endpoint::from_location(&from.host, location);

        self.hops += 1;
        self.metrics.record_hop();
        if self.hops > self.config.max_hops {
            tracing::warn!(
                hops = self.hops,
                host = %next.host,
                path = %next.path,
                "Redirect budget exhausted"
            );
            return Err(Error::too_many_redirects(next.to_string(), self.hops));
        }

        tracing::debug!(hop = self.hops, host = %next.host, path = %next.path, "Redirecting");

        if next.path_only() == self.config.login_path {
            return Ok(HopState::LoginPrompt { endpoint: next });
        }
        if next.path.starts_with(&self.config.logout_confirm_prefix) {
            return Ok(HopState::LogoutConfirm { endpoint: next });
        }

        let response = self.get(&next).await?;
        match response.status_code() {
            200 => Ok(self.classify_page(next, response.body, leg)?),
            302 => Ok(HopState::Following {
                from: next,
                response,
                leg,
            }),
            status => Err(Error::unexpected_status(next.to_string(), status)),
        }
    }

    /// Decide whether a 200 page is a relay page or the resource
    fn classify_page(&self, page: Endpoint, body: String, leg: Leg) -> Result<HopState> {
        let relay = match leg {
            Leg::Initial => Some(RelayForm::extract(&body, &page)?),
            Leg::AfterLogin => RelayForm::sniff(&body, &page),
            Leg::Final => None,
        };

        Ok(match relay {
            Some(form) => HopState::Relay { page, form },
            None => {
                tracing::info!(
                    hop = self.hops,
                    host = %page.host,
                    path = %page.path,
                    "Resource reached"
                );
                HopState::Final(FetchResult {
                    path: page.path,
                    status_code: 200,
                    body,
                })
            }
        })
    }

    async fn login(&mut self, endpoint: Endpoint) -> Result<HopState> {
        if self.logged_in {
            return Err(Error::login_failed(
                "gateway asked for credentials again",
                endpoint.to_string(),
                None,
            ));
        }
        self.logged_in = true;
        self.metrics.record_login();

        tracing::info!(
            hop = self.hops,
            host = %endpoint.host,
            path = %endpoint.path,
            username = %self.config.credentials.username,
            "Login prompt"
        );

        if self.config.prefetch_login_page {
            let page = self.get(&endpoint).await?;
            if !page.is_ok() {
                return Err(Error::login_failed(
                    "login page could not be loaded",
                    endpoint.to_string(),
                    Some(page.status_code()),
                ));
            }
        }

        let credentials = &self.config.credentials;
        let fields = FormFields::new()
            .with("username", credentials.username.as_str())
            .with("password", credentials.password())
            .with("vhost", self.config.login_vhost.as_str());

        let mut response = self.post(&endpoint, &fields).await?;
        if response.is_ok() {
            // Two-step gateways hand out their session cookies first
            tracing::debug!(
                host = %endpoint.host,
                path = %endpoint.path,
                "Login answered 200, posting again"
            );
            response = self.post(&endpoint, &fields).await?;
        }

        if !response.is_found() {
            return Err(Error::login_failed(
                "credentials were not accepted",
                endpoint.to_string(),
                Some(response.status_code()),
            ));
        }

        Ok(HopState::Following {
            from: endpoint,
            response,
            leg: Leg::AfterLogin,
        })
    }

    async fn relay(&mut self, page: Endpoint, form: RelayForm) -> Result<HopState> {
        self.metrics.record_relay();
        tracing::info!(
            hop = self.hops,
            host = %page.host,
            path = %page.path,
            action = %form.action,
            fields = form.len(),
            "Relay page"
        );

        let response = self.post(&form.action, &form.fields).await?;
        if !response.is_found() {
            return Err(Error::relay_submission(
                form.action.to_string(),
                response.status_code(),
            ));
        }

        Ok(HopState::Following {
            from: form.action,
            response,
            leg: Leg::Final,
        })
    }

    async fn confirm_logout(&mut self, endpoint: Endpoint) -> Result<HopState> {
        tracing::info!(
            hop = self.hops,
            host = %endpoint.host,
            path = %endpoint.path,
            "Logout confirmation"
        );

        let page = self.get(&endpoint).await?;
        if !page.is_ok() {
            return Err(Error::unexpected_status(
                endpoint.to_string(),
                page.status_code(),
            ));
        }

        let form = RelayForm::extract(&page.body, &endpoint)?;
        if form.len() != 1 {
            tracing::debug!(
                fields = form.len(),
                "Logout confirmation form has an unusual field count"
            );
        }
        self.metrics.record_logout_confirmation();

        // Acknowledgment goes out without session cookies
        let response = self
            .call("POST", &endpoint, self.transport.post(&endpoint, "", &form.fields))
            .await?;
        self.absorb(&endpoint, &response);

        Ok(HopState::Final(FetchResult {
            path: endpoint.path,
            status_code: response.status_code(),
            body: response.body,
        }))
    }

    async fn get(&self, endpoint: &Endpoint) -> Result<TransportResponse> {
        let cookie_header = self.cookies.cookies_for(&endpoint.host, &endpoint.path);
        let response = self
            .call("GET", endpoint, self.transport.get(endpoint, &cookie_header))
            .await?;
        self.absorb(endpoint, &response);
        Ok(response)
    }

    async fn post(&self, endpoint: &Endpoint, fields: &FormFields) -> Result<TransportResponse> {
        let cookie_header = self.cookies.cookies_for(&endpoint.host, &endpoint.path);
        tracing::debug!(fields = ?fields.names(), "Posting form");
        let response = self
            .call(
                "POST",
                endpoint,
                self.transport.post(endpoint, &cookie_header, fields),
            )
            .await?;
        self.absorb(endpoint, &response);
        Ok(response)
    }

    fn absorb(&self, endpoint: &Endpoint, response: &TransportResponse) {
        self.cookies
            .absorb(response.set_cookies(), &endpoint.host, &endpoint.path);
    }

    /// Await a transport call under the per-call timeout
    async fn call<F>(
        &self,
        method: &str,
        endpoint: &Endpoint,
        request: F,
    ) -> Result<TransportResponse>
    where
        F: Future<Output = Result<TransportResponse>>,
    {
        let start = Instant::now();
        let response = tokio::time::timeout(self.config.timeout, request)
            .await
            .map_err(|_| {
                Error::timeout_with_url(
                    method,
                    self.config.timeout.as_millis() as u64,
                    endpoint.to_string(),
                )
            })?
            .map_err(|e| {
                tracing::warn!(
                    method,
                    host = %endpoint.host,
                    path = %endpoint.path,
                    error = %e,
                    "Request failed"
                );
                e
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        self.metrics.record_request(latency_ms);

        tracing::info!(
            method,
            host = %endpoint.host,
            path = %endpoint.path,
            status = response.status_code(),
            time_ms = latency_ms,
            "Response"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::session::testing::{relay_page, ScriptedTransport, HOST};

    fn config() -> SessionConfig {
        SessionConfig::new(HOST, "jane", "hunter2")
    }

    async fn fetch(
        transport: &ScriptedTransport,
        config: &SessionConfig,
        path: &str,
    ) -> Result<FetchResult> {
        let cookies = CookieStore::new();
        let metrics = SessionMetrics::new();
        RedirectResolver::new(transport, &cookies, config, &metrics)
            .fetch(Endpoint::new(HOST, path))
            .await
    }

    #[tokio::test]
    async fn test_direct_200_takes_no_hops() {
        let transport = ScriptedTransport::new();
        transport.on("GET", HOST, "/index", TransportResponse::with_status(200).body("hello"));

        let cookies = CookieStore::new();
        let metrics = SessionMetrics::new();
        let config = config();
        let mut resolver = RedirectResolver::new(&transport, &cookies, &config, &metrics);
        let result = resolver.fetch(Endpoint::new(HOST, "/index")).await.unwrap();

        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, "hello");
        assert_eq!(resolver.hops(), 0);
    }

    #[tokio::test]
    async fn test_missing_location() {
        let transport = ScriptedTransport::new();
        transport.on("GET", HOST, "/index", TransportResponse::with_status(302));

        let err = fetch(&transport, &config(), "/index").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRedirect);
        assert_eq!(err.status_code(), Some(302));
    }

    #[tokio::test]
    async fn test_unexpected_status_mid_chain() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/elsewhere");
        transport.on("GET", HOST, "/elsewhere", TransportResponse::with_status(500));

        let err = fetch(&transport, &config(), "/index").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        assert_eq!(err.url(), Some("intranet.example.com/elsewhere"));
    }

    #[tokio::test]
    async fn test_initial_200_must_be_relay_page() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/not-a-relay");
        transport.on(
            "GET",
            HOST,
            "/not-a-relay",
            TransportResponse::with_status(200).body("<p>hi</p>"),
        );

        let err = fetch(&transport, &config(), "/index").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRelayPage);
    }

    #[tokio::test]
    async fn test_relay_then_resource() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/vdesk/refresh");
        transport.on(
            "GET",
            HOST,
            "/vdesk/refresh",
            TransportResponse::with_status(200)
                .body(relay_page("https://idp.example/sso", &[("token", "t1")])),
        );
        transport.on(
            "POST",
            "idp.example",
            "/sso",
            TransportResponse::with_status(302)
                .header("location", "https://intranet.example.com/index"),
        );
        transport.on("GET", HOST, "/index", TransportResponse::with_status(200).body("resource"));

        let result = fetch(&transport, &config(), "/index").await.unwrap();
        assert_eq!(result.body, "resource");

        let post = transport.calls_to("POST", "/sso").remove(0);
        assert_eq!(post.fields.unwrap().get("token"), Some("t1"));
    }

    #[tokio::test]
    async fn test_relay_submission_must_redirect() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/vdesk/refresh");
        transport.on(
            "GET",
            HOST,
            "/vdesk/refresh",
            TransportResponse::with_status(200).body(relay_page("/vdesk/post", &[("a", "1")])),
        );
        transport.on("POST", HOST, "/vdesk/post", TransportResponse::with_status(200));

        let err = fetch(&transport, &config(), "/index").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RelaySubmission);
        assert_eq!(err.status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_hop_cap() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/bogus/0");
        for i in 0..15 {
            transport.redirect(HOST, &format!("/bogus/{}", i), &format!("/bogus/{}", i + 1));
        }

        let err = fetch(&transport, &config(), "/index").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyRedirects);
        assert!(matches!(err, Error::TooManyRedirects { hops: 11, .. }));
    }

    #[tokio::test]
    async fn test_single_step_login() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/my.policy");
        transport.on(
            "POST",
            HOST,
            "/my.policy",
            TransportResponse::with_status(302)
                .header("location", "/index")
                .header("set-cookie", "MRHSession=s1; path=/"),
        );
        transport.on("GET", HOST, "/index", TransportResponse::with_status(200).body("resource"));

        let result = fetch(&transport, &config(), "/index").await.unwrap();
        assert_eq!(result.body, "resource");

        let posts = transport.calls_to("POST", "/my.policy");
        assert_eq!(posts.len(), 1);
        let fields = posts[0].fields.clone().unwrap();
        assert_eq!(fields.names(), vec!["username", "password", "vhost"]);
        assert_eq!(fields.get("vhost"), Some("standard"));

        let last_get = transport.calls_to("GET", "/index").pop().unwrap();
        assert_eq!(last_get.cookie, "MRHSession=s1");
    }

    #[tokio::test]
    async fn test_two_step_login() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/my.policy");
        transport.on(
            "POST",
            HOST,
            "/my.policy",
            TransportResponse::with_status(200).header("set-cookie", "MRHSession=s1; path=/"),
        );
        transport.on(
            "POST",
            HOST,
            "/my.policy",
            TransportResponse::with_status(302).header("location", "/index"),
        );
        transport.on("GET", HOST, "/index", TransportResponse::with_status(200).body("resource"));

        let result = fetch(&transport, &config(), "/index").await.unwrap();
        assert_eq!(result.body, "resource");

        let posts = transport.calls_to("POST", "/my.policy");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].cookie, "");
        assert_eq!(posts[1].cookie, "MRHSession=s1");
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/my.policy");
        transport.on("POST", HOST, "/my.policy", TransportResponse::with_status(200));

        let err = fetch(&transport, &config(), "/index").await.unwrap_err();
        assert!(err.is_login_failure());
        assert_eq!(transport.calls_to("POST", "/my.policy").len(), 2);
    }

    #[tokio::test]
    async fn test_login_loop_is_login_failure() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/my.policy");
        transport.on(
            "POST",
            HOST,
            "/my.policy",
            TransportResponse::with_status(302).header("location", "/my.policy"),
        );

        let err = fetch(&transport, &config(), "/index").await.unwrap_err();
        assert!(err.is_login_failure());
        assert_eq!(transport.calls_to("POST", "/my.policy").len(), 1);
    }

    #[tokio::test]
    async fn test_login_with_prefetch() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/index", "/my.policy");
        transport.on(
            "GET",
            HOST,
            "/my.policy",
            TransportResponse::with_status(200).header("set-cookie", "LastMRH_Session=a; path=/"),
        );
        transport.on(
            "POST",
            HOST,
            "/my.policy",
            TransportResponse::with_status(302).header("location", "/index"),
        );
        transport.on("GET", HOST, "/index", TransportResponse::with_status(200).body("resource"));

        let config = config().prefetch_login_page(true);
        let result = fetch(&transport, &config, "/index").await.unwrap();
        assert_eq!(result.body, "resource");
        assert_eq!(transport.calls_to("POST", "/my.policy")[0].cookie, "LastMRH_Session=a");
    }

    #[tokio::test]
    async fn test_logout_confirmation_posts_without_cookies() {
        let transport = ScriptedTransport::new();
        transport.on(
            "GET",
            HOST,
            "/Shibboleth.sso/Logout",
            TransportResponse::with_status(302)
                .header("location", "https://idp.example/idp/profile/Logout?execution=e1s1"),
        );
        transport.on(
            "GET",
            "idp.example",
            "/idp/profile/Logout?execution=e1s1",
            TransportResponse::with_status(200)
                .header("set-cookie", "shib_idp_session=x; path=/")
                .body(relay_page(
                    "/idp/profile/Logout?execution=e1s1",
                    &[("_eventId_proceed", "")],
                )),
        );
        transport.on(
            "POST",
            "idp.example",
            "/idp/profile/Logout?execution=e1s1",
            TransportResponse::with_status(200).body("logged out"),
        );

        let result = fetch(&transport, &config(), "/Shibboleth.sso/Logout").await.unwrap();
        assert_eq!(result.body, "logged out");
        assert_eq!(result.status_code, 200);

        let post = transport.calls_to("POST", "/idp/profile/Logout?execution=e1s1").remove(0);
        assert_eq!(post.cookie, "");
        assert_eq!(post.fields.unwrap().names(), vec!["_eventId_proceed"]);
    }

    #[tokio::test]
    async fn test_logout_confirmation_forwards_any_status() {
        let transport = ScriptedTransport::new();
        transport.redirect(HOST, "/Shibboleth.sso/Logout", "/idp/profile/Logout");
        transport.on(
            "GET",
            HOST,
            "/idp/profile/Logout",
            TransportResponse::with_status(200).body(relay_page("", &[("x", "1")])),
        );
        transport.on(
            "POST",
            HOST,
            "/idp/profile/Logout",
            TransportResponse::with_status(404).body("gone"),
        );

        let result = fetch(&transport, &config(), "/Shibboleth.sso/Logout").await.unwrap();
        assert_eq!(result.status_code, 404);
        assert_eq!(result.body, "gone");
    }

    #[tokio::test]
    async fn test_transport_timeout() {
        let transport = ScriptedTransport::new().with_delay(std::time::Duration::from_secs(5));
        transport.on("GET", HOST, "/slow", TransportResponse::with_status(200));

        let config = config().timeout(std::time::Duration::from_millis(50));
        let err = fetch(&transport, &config, "/slow").await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.is_network());
    }
}
