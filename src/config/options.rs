// src/config/options.rs
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::core::pause::Pause;
use crate::core::retry::RetryPolicy;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    /// Boxes (SEI units) captured by one cycle, in order.
    pub boxes: Vec<String>,
    pub capture: CaptureOptions,
    pub store: StoreOptions,
    pub driver: DriverOptions,
    pub session: SessionOptions,
    pub schedule: ScheduleOptions,
    pub log: LogOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            capture: CaptureOptions::default(),
            store: StoreOptions::default(),
            driver: DriverOptions::default(),
            session: SessionOptions::default(),
            schedule: ScheduleOptions::default(),
            log: LogOptions::default(),
        }
    }
}

/// What to do when a pass saw no records at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileGuard {
    /// Reconcile only when at least one record was seen.
    RequireSightings,
    /// Reconcile unconditionally; an empty pass concludes every open record.
    Always,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureOptions {
    pub max_pages: u32,
    pub guard: ReconcileGuard,
    /// Abort the pass when the first page has no listing table.
    pub require_listing: bool,
    pub settle: Pause,
    /// Finding and clicking the next-page control. Running out of attempts
    /// fails the pass.
    pub advance_retry: RetryPolicy,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            guard: ReconcileGuard::RequireSightings,
            require_listing: false,
            settle: Pause::between_ms(SETTLE_MIN_MS, SETTLE_MAX_MS),
            advance_retry: RetryPolicy::fixed(ADVANCE_RETRY_ATTEMPTS, Duration::from_secs(ADVANCE_RETRY_DELAY_SECS)),
        }
    }
}

impl CaptureOptions {
    /// No settle delays; used for offline replays and tests.
    pub fn instant() -> Self {
        Self {
            settle: Pause::None,
            advance_retry: RetryPolicy::fixed(ADVANCE_RETRY_ATTEMPTS, Duration::ZERO),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub base_dir: PathBuf,
    /// Responsible-list file; `<base_dir>/responsaveis.json` when unset.
    pub responsible_file: Option<PathBuf>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { base_dir: PathBuf::from(DEFAULT_BASE_DIR), responsible_file: None }
    }
}

impl StoreOptions {
    pub fn responsible_path(&self) -> PathBuf {
        self.responsible_file.clone().unwrap_or_else(|| self.base_dir.join(RESPONSIBLE_FILE))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub http_timeout: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: s!(DEFAULT_WEBDRIVER_URL),
            headless: false,
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub login_url: String,
    pub orgao: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            login_url: s!(DEFAULT_LOGIN_URL),
            orgao: s!(DEFAULT_ORGAO),
            user: None,
            password: None,
        }
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("login_url", &self.login_url)
            .field("orgao", &self.orgao)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl SessionOptions {
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let user = self.user.as_deref().ok_or(ConfigError::Missing("USER_EMAIL"))?;
        let password = self.password.as_deref().ok_or(ConfigError::Missing("USER_PASSWORD"))?;
        Ok((user, password))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub every: Duration,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self { every: Duration::from_secs(DEFAULT_CYCLE_HOURS * 60 * 60) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogOptions {
    pub level: String,
    pub dir: PathBuf,
    pub console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: s!("info"),
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            console: true,
        }
    }
}

impl AppOptions {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build options from any key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut opts = Self::default();

        if let Some(unit) = get("UNIDADE") {
            opts.boxes.push(unit);
        }
        if let Some(dir) = get("BASES_DADOS_DIR") {
            opts.store.base_dir = PathBuf::from(dir);
        }
        if let Some(file) = get("RESPONSAVEIS_FILE") {
            opts.store.responsible_file = Some(PathBuf::from(file));
        }
        if let Some(url) = get("WEBDRIVER_URL") {
            opts.driver.webdriver_url = url;
        }
        if let Some(flag) = get("HEADLESS") {
            opts.driver.headless = truthy(&flag);
        }
        if let Some(url) = get("SEI_LOGIN_URL") {
            opts.session.login_url = url;
        }
        if let Some(orgao) = get("SEI_ORGAO") {
            opts.session.orgao = orgao;
        }
        opts.session.user = get("USER_EMAIL");
        opts.session.password = get("USER_PASSWORD");
        if let Some(level) = get("LOG_LEVEL") {
            opts.log.level = level.to_ascii_lowercase();
        }
        if let Some(dir) = get("LOG_DIR") {
            opts.log.dir = PathBuf::from(dir);
        }
        if let Some(flag) = get("REQUIRE_LISTING") {
            opts.capture.require_listing = truthy(&flag);
        }
        if let Some(n) = get("MAX_PAGES").and_then(|v| v.parse().ok()) {
            opts.capture.max_pages = n;
        }
        opts
    }
}

fn truthy(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
