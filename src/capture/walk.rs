// src/capture/walk.rs
use crate::config::consts::{NEXT_PAGE_BOTTOM_ID, NEXT_PAGE_TOP_ID};
use crate::driver::{Browser, Locator};
use crate::error::BrowserResult;

/// Where the pagination walk stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkState {
    OnPage,
    Advancing,
    Done,
}

/// Next-page controls, in the order they are tried.
pub fn next_controls() -> [Locator; 2] {
    [
        Locator::css(format!("#{NEXT_PAGE_TOP_ID} img")),
        Locator::id(NEXT_PAGE_BOTTOM_ID),
    ]
}

/// First next-page control present on the current page, if any. A stale
/// lookup is an error, never "no control".
pub fn find_next_control<B: Browser + ?Sized>(browser: &mut B) -> BrowserResult<Option<B::Element>> {
    for locator in next_controls() {
        if let Some(el) = browser.find(None, &locator)? {
            logd!(control = %locator, "next page control found");
            return Ok(Some(el));
        }
    }
    Ok(None)
}
