// src/driver/wait.rs
use std::thread;
use std::time::{Duration, Instant};

use super::{Browser, Locator};
use crate::config::consts::WAIT_POLL_MS;
use crate::error::{BrowserError, BrowserResult};

/// Poll-until-present with a deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub poll: Duration,
}

impl Wait {
    pub fn secs(secs: u64) -> Self {
        Self { timeout: Duration::from_secs(secs), poll: Duration::from_millis(WAIT_POLL_MS) }
    }

    /// Probe once, no waiting.
    pub fn immediate() -> Self {
        Self { timeout: Duration::ZERO, poll: Duration::ZERO }
    }

    /// Run `probe` until it yields a value or the timeout elapses. Transient
    /// errors and not-found count as "not yet"; anything else is returned.
    pub fn until<B, T, F>(&self, browser: &mut B, what: &str, mut probe: F) -> BrowserResult<T>
    where
        B: Browser + ?Sized,
        F: FnMut(&mut B) -> BrowserResult<Option<T>>,
    {
        let started = Instant::now();
        loop {
            match probe(browser) {
                Ok(Some(v)) => return Ok(v),
                Ok(None) => {}
                Err(e) if e.is_transient() || matches!(e, BrowserError::NotFound(_)) => {
                    logd!("waiting for {what}: {e}");
                }
                Err(e) => return Err(e),
            }
            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(BrowserError::Timeout { what: s!(what), waited_ms: waited.as_millis() });
            }
            thread::sleep(self.poll.min(self.timeout - waited));
        }
    }

    /// Wait for the first element matching `locator`.
    pub fn for_element<B>(&self, browser: &mut B, locator: &Locator) -> BrowserResult<B::Element>
    where
        B: Browser + ?Sized,
    {
        let what = locator.to_string();
        self.until(browser, &what, |b| b.find(None, locator))
    }

    /// Wait for a frame by name or id and switch into it.
    /// Leaves the session inside the frame on success.
    pub fn for_frame<B>(&self, browser: &mut B, name: &str) -> BrowserResult<()>
    where
        B: Browser + ?Sized,
    {
        let locator = Locator::frame(name);
        let frame = self
            .for_element(browser, &locator)
            .map_err(|e| match e {
                BrowserError::Timeout { .. } => BrowserError::NoFrame(s!(name)),
                other => other,
            })?;
        browser.enter_frame(&frame)
    }
}
