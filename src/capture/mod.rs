// src/capture/mod.rs
//! One capture pass over one box: walk every listing page, persist each page's
//! sightings as its own batch, then reconcile the store against everything seen.
//!
//! Session context: top-level document on entry, with the box's detailed
//! listing already open. Left on whatever listing page the walk ended on.
//!
//! Only a walk that ends because the last page has no next control reconciles.
//! Any error on the way out leaves concluded flags untouched.

use std::collections::HashSet;

use chrono::Local;

use crate::config::consts::LISTING_TABLE_ID;
use crate::config::options::{CaptureOptions, ReconcileGuard};
use crate::driver::{Browser, Locator};
use crate::core::retry::execute_with_retry;
use crate::error::{BrowserError, CaptureError};
use crate::progress::Progress;
use crate::store::{CaseLedger, CaseRecord};

pub mod extract;
pub mod walk;

pub use extract::{Sighting, extract_page, extract_rows};
pub use walk::{WalkState, find_next_control};

/// Outcome of one capture pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureReport {
    pub pages: u32,
    /// Sightings extracted, duplicates across pages included.
    pub rows_seen: usize,
    pub persisted: usize,
    /// Distinct case numbers seen.
    pub distinct: usize,
    pub concluded: usize,
    pub reconciled: bool,
}

pub fn capture_box<B, L>(
    browser: &mut B,
    ledger: &mut L,
    box_name: &str,
    opts: &CaptureOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<CaptureReport, CaptureError>
where
    B: Browser + ?Sized,
    L: CaseLedger + ?Sized,
{
    let mut report = CaptureReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut state = WalkState::OnPage;
    let mut next = None;

    logf!(box_name, "capture started");

    while state != WalkState::Done {
        match state {
            WalkState::OnPage => {
                if report.pages >= opts.max_pages {
                    loge!(box_name, pages = report.pages, "page limit reached; store left unreconciled");
                    return Err(CaptureError::PageLimit { box_name: s!(box_name), pages: report.pages });
                }
                report.pages += 1;
                browser.scroll_to_top()?;

                if report.pages == 1 && opts.require_listing && !listing_present(browser)? {
                    return Err(CaptureError::ListingMissing(s!(box_name)));
                }

                let sightings = extract_page(browser)?;
                let now = Local::now().naive_local();
                let batch: Vec<CaseRecord> = sightings
                    .iter()
                    .map(|s| CaseRecord::sighted(&s.case_number, &s.assignee, box_name, now))
                    .collect();
                report.rows_seen += sightings.len();
                report.persisted += ledger.upsert(&batch)?;
                seen.extend(sightings.into_iter().map(|s| s.case_number));

                logd!(box_name, page = report.pages, rows = batch.len(), "page persisted");
                if let Some(p) = progress.as_deref_mut() {
                    p.page_done(box_name, report.pages, batch.len());
                }

                next = execute_with_retry(&opts.advance_retry, "find next page", BrowserError::is_transient, |_| {
                    find_next_control(browser)
                })?;
                state = if next.is_some() { WalkState::Advancing } else { WalkState::Done };
            }
            WalkState::Advancing => {
                let mut control = next.take();
                execute_with_retry(&opts.advance_retry, "click next page", BrowserError::is_transient, |_| {
                    let el = match control.take() {
                        Some(el) => el,
                        // The control seen on the page is gone; look it up again.
                        None => find_next_control(browser)?
                            .ok_or_else(|| BrowserError::Stale(s!("next page control")))?,
                    };
                    browser.click(&el)
                })
                .inspect_err(|e| loge!(box_name, page = report.pages, "cannot leave page: {e}; store left unreconciled"))?;
                opts.settle.sleep();
                state = WalkState::OnPage;
            }
            WalkState::Done => {}
        }
    }

    report.distinct = seen.len();
    if seen.is_empty() && opts.guard == ReconcileGuard::RequireSightings {
        logw!(box_name, pages = report.pages, "no records seen; reconciliation skipped");
    } else {
        report.concluded = ledger.mark_concluded(&seen)?;
        report.reconciled = true;
    }

    logf!(
        box_name,
        pages = report.pages,
        rows = report.rows_seen,
        distinct = report.distinct,
        concluded = report.concluded,
        "capture finished"
    );
    Ok(report)
}

fn listing_present<B: Browser + ?Sized>(browser: &mut B) -> Result<bool, BrowserError> {
    Ok(browser.find(None, &Locator::id(LISTING_TABLE_ID))?.is_some())
}
