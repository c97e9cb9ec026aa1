// src/sei/login.rs
use super::SessionWaits;
use crate::config::consts::*;
use crate::config::options::SessionOptions;
use crate::driver::{Browser, Locator};
use crate::error::{BrowserError, BrowserResult, CaptureError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginStatus {
    Success,
    /// The portal answered the submit with an alert.
    InvalidCredentials,
}

/// Fill and submit the login form, then confirm the home page loaded.
pub fn login<B: Browser + ?Sized>(
    browser: &mut B,
    session: &SessionOptions,
    waits: &SessionWaits,
) -> Result<LoginStatus, CaptureError> {
    let (user, password) = session.credentials()?;
    logf!(url = %session.login_url, "logging in");
    browser.goto(&session.login_url)?;

    let field = waits.element.for_element(browser, &Locator::id(LOGIN_USER_ID))?;
    browser.send_keys(&field, user)?;
    let field = waits.element.for_element(browser, &Locator::id(LOGIN_PASSWORD_ID))?;
    browser.send_keys(&field, password)?;
    choose_option(browser, LOGIN_ORGAO_ID, &session.orgao)?;

    let submit = waits.element.for_element(browser, &Locator::id(LOGIN_SUBMIT_ID))?;
    browser.click(&submit)?;

    match waits.alert.until(browser, "login alert", |b| Ok(b.accept_alert()?.then_some(()))) {
        Ok(()) => {
            logw!("login rejected by the portal");
            return Ok(LoginStatus::InvalidCredentials);
        }
        Err(BrowserError::Timeout { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    match waits.login.for_element(browser, &Locator::css(LOGIN_OK_CSS)) {
        Ok(_) => {}
        Err(BrowserError::Timeout { .. }) => {
            return Err(CaptureError::LoginFailed(s!("process control page did not load")));
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(bar) = browser.find(None, &Locator::id(LOGIN_ERROR_BAR_ID))? {
        let text = browser.text(&bar)?;
        if text.contains("Erro") {
            return Err(CaptureError::LoginFailed(text));
        }
    }

    logf!("login confirmed");
    Ok(LoginStatus::Success)
}

/// Pick the `<option>` of a `<select>` by its visible text.
fn choose_option<B: Browser + ?Sized>(browser: &mut B, select_id: &str, label: &str) -> BrowserResult<()> {
    let options = browser.find_all(None, &Locator::css(format!("#{select_id} option")))?;
    for opt in &options {
        if browser.text(opt)? == label {
            return browser.click(opt);
        }
    }
    logw!(select = select_id, label, "option not offered; keeping the default");
    Ok(())
}

/// Close the notice shown after login, if any. Never fails the session.
pub fn close_notice<B: Browser + ?Sized>(browser: &mut B, waits: &SessionWaits) -> bool {
    let found = waits.notice.for_element(browser, &Locator::xpath(NOTICE_CLOSE_XPATH));
    match found.and_then(|close| browser.js_click(&close)) {
        Ok(()) => {
            logf!("post-login notice closed");
            true
        }
        Err(BrowserError::Timeout { .. }) => {
            logd!("no post-login notice");
            false
        }
        Err(e) => {
            logw!("could not close the post-login notice: {e}");
            false
        }
    }
}

/// Make `box_name` the active unit. `Ok(false)` when the unit is not offered.
pub fn select_unit<B: Browser + ?Sized>(
    browser: &mut B,
    box_name: &str,
    waits: &SessionWaits,
) -> BrowserResult<bool> {
    let link = waits.element.for_element(browser, &Locator::css(UNIT_LINK_CSS))?;
    let current = browser.text(&link)?;
    if current.contains(box_name) {
        logd!(box_name, "unit already active");
        return Ok(true);
    }

    browser.click(&link)?;
    waits.element.for_element(browser, &Locator::id(UNIT_ORGAO_ID))?;

    let rows = browser.find_all(None, &Locator::css(UNIT_ROWS_CSS))?;
    for row in &rows {
        let cells = browser.find_all(Some(row), &Locator::tag("td"))?;
        if cells.len() < 2 || !browser.text(&cells[1])?.contains(box_name) {
            continue;
        }
        let radio = browser.find(Some(&cells[0]), &Locator::css("input[type='radio']"))?;
        browser.click(radio.as_ref().unwrap_or(&cells[0]))?;
        waits.settle.sleep();
        logf!(box_name, "unit selected");
        return Ok(true);
    }

    logw!(box_name, units = rows.len(), "unit not found in the unit list");
    Ok(false)
}
