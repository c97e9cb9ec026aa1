// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::driver::Locator;

/// Failures at the browser boundary.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("element not found: {0}")]
    NotFound(Locator),

    #[error("timed out after {waited_ms} ms waiting for {what}")]
    Timeout { what: String, waited_ms: u128 },

    #[error("stale element reference: {0}")]
    Stale(String),

    #[error("frame not available: {0}")]
    NoFrame(String),

    #[error("no alert present")]
    NoAlert,

    #[error("locator not supported by this browser: {0}")]
    Unsupported(Locator),

    #[error("webdriver error `{code}`: {message}")]
    Protocol { code: String, message: String },

    #[error("webdriver transport: {0}")]
    Transport(String),
}

impl BrowserError {
    /// Conditions that may clear up on their own if the step is tried again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BrowserError::Timeout { .. } | BrowserError::Stale(_) | BrowserError::NoFrame(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            BrowserError::NotFound(_) => "not_found",
            BrowserError::Timeout { .. } => "timeout",
            BrowserError::Stale(_) => "stale",
            BrowserError::NoFrame(_) => "no_frame",
            BrowserError::NoAlert => "no_alert",
            BrowserError::Unsupported(_) => "unsupported",
            BrowserError::Protocol { .. } => "protocol",
            BrowserError::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for BrowserError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BrowserError::Timeout { what: s!("webdriver response"), waited_ms: 0 }
        } else {
            BrowserError::Transport(e.to_string())
        }
    }
}

pub type BrowserResult<T> = Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot prepare store directory {path}: {source}")]
    Dir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store for box `{0}` not found")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("cannot create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("cannot read responsible list {path}: {source}")]
    ResponsibleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed responsible list {path}: {source}")]
    ResponsibleParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything that can end a capture pass or a cycle early.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("listing table missing on the first page of box `{0}`")]
    ListingMissing(String),

    #[error("box `{box_name}` still had a next page after {pages} pages")]
    PageLimit { box_name: String, pages: u32 },

    #[error("login rejected: invalid credentials")]
    InvalidCredentials,

    #[error("login not confirmed: {0}")]
    LoginFailed(String),

    #[error("unit `{0}` is not offered to this user")]
    UnitUnavailable(String),

    #[error("cannot read saved page: {0}")]
    Snapshot(#[from] std::io::Error),

    #[error("{failed} of {total} boxes failed")]
    Cycle { failed: usize, total: usize },
}

impl From<rusqlite::Error> for CaptureError {
    fn from(e: rusqlite::Error) -> Self {
        CaptureError::Store(StoreError::Sqlite(e))
    }
}
