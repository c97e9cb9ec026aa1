// src/runner.rs
use std::path::PathBuf;
use std::thread;

use crate::{
    capture::{self, CaptureReport},
    config::options::{AppOptions, CaptureOptions},
    core::{pause::Pause, retry::RetryPolicy},
    driver::{Browser, snapshot::SnapshotBrowser, webdriver::WebDriverSession},
    error::{CaptureError, ConfigError},
    progress::{self, Progress},
    sei::{self, LoginStatus, SessionWaits},
    store::CaseStore,
};

/// How one box fared in a cycle.
#[derive(Debug)]
pub struct BoxOutcome {
    pub box_name: String,
    pub result: Result<CaptureReport, CaptureError>,
}

/// Summary of what a cycle did.
#[derive(Debug, Default)]
pub struct CycleSummary {
    pub outcomes: Vec<BoxOutcome>,
}

impl CycleSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// `Err(Cycle)` when any box failed.
    pub fn check(&self) -> Result<(), CaptureError> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(CaptureError::Cycle { failed, total: self.outcomes.len() }),
        }
    }
}

/// Log in and dismiss the post-login notice.
pub fn open_session<B: Browser + ?Sized>(
    browser: &mut B,
    opts: &AppOptions,
    waits: &SessionWaits,
) -> Result<(), CaptureError> {
    match sei::login(browser, &opts.session, waits)? {
        LoginStatus::Success => {}
        LoginStatus::InvalidCredentials => return Err(CaptureError::InvalidCredentials),
    }
    sei::close_notice(browser, waits);
    Ok(())
}

/// Capture every configured box on an authenticated session. A failing box is
/// logged and the next one still runs.
pub fn capture_boxes<B: Browser + ?Sized>(
    browser: &mut B,
    opts: &AppOptions,
    waits: &SessionWaits,
    mut progress: Option<&mut dyn Progress>,
) -> CycleSummary {
    let mut summary = CycleSummary::default();
    if let Some(p) = progress.as_deref_mut() {
        p.begin(opts.boxes.len());
    }

    for box_name in &opts.boxes {
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Capturing {box_name}…"));
        }
        let result = capture_one(browser, box_name, opts, waits, progress::reborrow(&mut progress));
        match &result {
            Ok(r) => logf!(box_name = %box_name, records = r.distinct, concluded = r.concluded, "box done"),
            Err(e) => loge!(box_name = %box_name, "box failed: {e}"),
        }
        // Next box starts from the top-level document.
        if let Err(e) = browser.leave_frames() {
            logw!("could not return to the top-level document: {e}");
        }
        summary.outcomes.push(BoxOutcome { box_name: box_name.clone(), result });
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    summary
}

fn capture_one<B: Browser + ?Sized>(
    browser: &mut B,
    box_name: &str,
    opts: &AppOptions,
    waits: &SessionWaits,
    progress: Option<&mut dyn Progress>,
) -> Result<CaptureReport, CaptureError> {
    if !sei::select_unit(browser, box_name, waits)? {
        return Err(CaptureError::UnitUnavailable(s!(box_name)));
    }
    sei::prepare_listing(browser, waits)?;
    let mut store = CaseStore::open(&opts.store.base_dir, box_name)?;
    capture::capture_box(browser, &mut store, box_name, &opts.capture, progress)
}

/// One full cycle against the live portal: browser, login, every box. The
/// browser is closed on every path.
pub fn run_cycle(opts: &AppOptions, progress: Option<&mut dyn Progress>) -> Result<CycleSummary, CaptureError> {
    if opts.boxes.is_empty() {
        return Err(ConfigError::Missing("UNIDADE").into());
    }
    opts.session.credentials()?;

    logf!(boxes = opts.boxes.len(), "cycle started");
    let waits = SessionWaits::default();
    let mut browser = WebDriverSession::start(&opts.driver)?;

    let result = open_session(&mut browser, opts, &waits)
        .map(|()| capture_boxes(&mut browser, opts, &waits, progress));

    if let Err(e) = browser.quit() {
        logw!("browser did not close cleanly: {e}");
    }
    result
}

/// Re-run the cycle forever, or `cycles` times. Errors are logged, never fatal.
pub fn run_schedule(opts: &AppOptions, cycles: Option<u32>, mut progress: Option<&mut dyn Progress>) {
    let mut done = 0u32;
    loop {
        match run_cycle(opts, progress::reborrow(&mut progress)) {
            Ok(summary) => match summary.check() {
                Ok(()) => logf!(boxes = summary.outcomes.len(), "cycle finished"),
                Err(e) => loge!("cycle finished with failures: {e}"),
            },
            Err(e) => loge!("cycle aborted: {e}"),
        }
        done += 1;
        if cycles.is_some_and(|n| done >= n) {
            return;
        }
        logf!("next cycle in {} h", opts.schedule.every.as_secs() / 3600);
        thread::sleep(opts.schedule.every);
    }
}

/// Capture saved listing pages into a box's store, without a browser.
pub fn replay(
    box_name: &str,
    pages: &[PathBuf],
    opts: &AppOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<CaptureReport, CaptureError> {
    let mut browser = SnapshotBrowser::from_files(pages)?;
    logf!(box_name, pages = browser.page_count(), "replaying saved pages");
    let mut store = CaseStore::open(&opts.store.base_dir, box_name)?;
    let capture = CaptureOptions { settle: Pause::None, advance_retry: RetryPolicy::once(), ..opts.capture.clone() };
    capture::capture_box(&mut browser, &mut store, box_name, &capture, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_without_boxes_is_a_config_error() {
        let opts = AppOptions::default();
        assert!(matches!(run_cycle(&opts, None), Err(CaptureError::Config(ConfigError::Missing("UNIDADE")))));
    }

    #[test]
    fn cycle_without_credentials_fails_before_the_browser() {
        let mut opts = AppOptions::default();
        opts.boxes.push(s!("BOX"));
        assert!(matches!(run_cycle(&opts, None), Err(CaptureError::Config(ConfigError::Missing("USER_EMAIL")))));
    }
}
