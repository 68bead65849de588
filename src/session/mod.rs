// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Gateway session
//!
//! Transparent login, relay and logout handling on top of the HTTP layer.

mod config;
mod form;
mod gate;
mod metrics;
mod resolver;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{
    Credentials, SessionConfig, DEFAULT_LOGIN_PATH, DEFAULT_LOGIN_VHOST,
    DEFAULT_LOGOUT_CONFIRM_PREFIX, DEFAULT_LOGOUT_PATH, DEFAULT_MAX_HOPS,
};
pub use form::RelayForm;
pub use gate::{SessionGate, SlotGuard};
pub use metrics::{MetricsReport, SessionMetrics};
pub use resolver::{FetchResult, HopState, Leg, RedirectResolver};
pub use session::IntranetSession;
