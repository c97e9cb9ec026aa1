// src/sei/mod.rs
//! Session preparation on the SEI portal: login, the post-login notice, unit
//! selection and the detailed listing.
//!
//! Every step expects the top-level document on entry and leaves the session
//! there on exit, including on failure.

use std::time::Duration;

use crate::config::consts::*;
use crate::core::pause::Pause;
use crate::core::retry::RetryPolicy;
use crate::driver::Wait;

pub mod listing;
pub mod login;

pub use listing::{assignment_only_detail_level, open_detailed_view, prepare_listing};
pub use login::{LoginStatus, close_notice, login, select_unit};

/// Waits used while preparing a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionWaits {
    pub element: Wait,
    pub login: Wait,
    pub alert: Wait,
    pub notice: Wait,
    pub frame: Wait,
    pub frame_retry: RetryPolicy,
    pub settle: Pause,
}

impl Default for SessionWaits {
    fn default() -> Self {
        Self {
            element: Wait::secs(ELEMENT_WAIT_SECS),
            login: Wait::secs(LOGIN_WAIT_SECS),
            alert: Wait::secs(ALERT_WAIT_SECS),
            notice: Wait::secs(NOTICE_WAIT_SECS),
            frame: Wait::secs(FRAME_WAIT_SECS),
            frame_retry: RetryPolicy::fixed(FRAME_RETRY_ATTEMPTS, Duration::from_secs(FRAME_RETRY_DELAY_SECS)),
            settle: Pause::between_ms(SETTLE_MIN_MS, SETTLE_MAX_MS),
        }
    }
}

impl SessionWaits {
    /// Probe once, never sleep. Same retry count as the default.
    pub fn instant() -> Self {
        Self {
            element: Wait::immediate(),
            login: Wait::immediate(),
            alert: Wait::immediate(),
            notice: Wait::immediate(),
            frame: Wait::immediate(),
            frame_retry: RetryPolicy::fixed(FRAME_RETRY_ATTEMPTS, Duration::ZERO),
            settle: Pause::None,
        }
    }
}
