// src/sei/listing.rs
use super::SessionWaits;
use crate::config::consts::*;
use crate::core::retry::execute_with_retry;
use crate::driver::{Browser, Locator};
use crate::error::{BrowserError, BrowserResult};

/// Switch the process control page to the detailed listing.
pub fn open_detailed_view<B: Browser + ?Sized>(browser: &mut B, waits: &SessionWaits) -> BrowserResult<()> {
    let link = waits.element.for_element(browser, &Locator::link_text(DETAILED_VIEW_LINK))?;
    browser.click(&link)?;
    waits.settle.sleep();
    logd!("detailed view opened");
    Ok(())
}

/// Limit the listing's detail columns to the assignment column, so each row
/// ends with the case link followed by the assignee link.
///
/// Runs inside the `modal-frame` dialog; returns to the top-level document on
/// every path.
pub fn assignment_only_detail_level<B: Browser + ?Sized>(
    browser: &mut B,
    waits: &SessionWaits,
) -> BrowserResult<()> {
    let result = execute_with_retry(&waits.frame_retry, "detail level dialog", BrowserError::is_transient, |attempt| {
        if attempt > 1 {
            browser.leave_frames()?;
            browser.refresh()?;
        }
        let opener = waits.element.for_element(browser, &Locator::id(DETAIL_LEVEL_ID))?;
        browser.click(&opener)?;
        waits.frame.for_frame(browser, DETAIL_MODAL_FRAME)
    })
    .and_then(|()| tick_assignment_only(browser, waits));

    let back = browser.leave_frames();
    result.and(back)
}

fn tick_assignment_only<B: Browser + ?Sized>(browser: &mut B, waits: &SessionWaits) -> BrowserResult<()> {
    let boxes = browser.find_all(None, &Locator::class(DETAIL_CHECKBOX_CLASS))?;
    let mut cleared = 0;
    for cb in &boxes {
        if browser.is_selected(cb)? {
            browser.js_click(cb)?;
            cleared += 1;
        }
    }

    let assignment = waits.element.for_element(browser, &Locator::id(DETAIL_ASSIGNMENT_ID))?;
    if !browser.is_selected(&assignment)? {
        browser.js_click(&assignment)?;
    }

    let save = waits.element.for_element(browser, &Locator::css(DETAIL_SAVE_CSS))?;
    browser.click(&save)?;
    waits.settle.sleep();
    logd!(cleared, "detail level set to assignment only");
    Ok(())
}

/// Detailed view, assignment-only columns, then scroll to the bottom so lazy
/// rows render. View and column failures are logged; the capture still runs.
pub fn prepare_listing<B: Browser + ?Sized>(browser: &mut B, waits: &SessionWaits) -> BrowserResult<()> {
    if let Err(e) = open_detailed_view(browser, waits) {
        logw!("detailed view not opened: {e}");
    }
    if let Err(e) = assignment_only_detail_level(browser, waits) {
        loge!("detail level not set: {e}");
    }
    browser.scroll_to_bottom()?;
    waits.settle.sleep();
    Ok(())
}
