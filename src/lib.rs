// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Intranet Session - SSO Gateway Client
//!
//! Fetches resources behind a reverse-proxy single-sign-on gateway as if
//! the gateway were not there. A single `get` follows the redirect chain,
//! posts credentials when the gateway asks for them, submits relay forms,
//! and returns the final body.
//!
//! ## Features
//!
//! - Explicit hop state machine with a redirect budget
//! - Two-step login support for gateways that want the credentials twice
//! - Relay form extraction from auto-submitting handoff pages
//! - In-memory cookie store with domain and path scoping
//! - One operation at a time per session, with a bounded FIFO wait queue
//! - Identity provider logout confirmation
//!
//! ## Example
//!
//! ```rust,no_run
//! use intranet_session::{IntranetSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new("intranet.example.com", "jane", "secret");
//!     let session = IntranetSession::new(config)?;
//!
//!     let page = session.get("/directory/search?q=smith").await?;
//!     println!("{} {}", page.status_code, page.body.len());
//!
//!     session.logout().await?;
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod http;
pub mod session;

// Re-exports for convenience

// Session
pub use session::{Credentials, FetchResult, IntranetSession, SessionConfig};
pub use session::{HopState, RedirectResolver, RelayForm, SessionGate};
pub use session::{MetricsReport, SessionMetrics};

// Errors
pub use error::{Error, ErrorKind, Result};

// HTTP
pub use http::{Cookie, CookieStore, Endpoint, FormFields, HttpClientConfig, HttpTransport};
pub use http::{Transport, TransportResponse};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
