// src/capture/extract.rs
//! Listing rows to (case number, assignee) sightings.
//!
//! The listing has no semantic markup for its columns. The contract that has
//! held across portal versions: the last link of a row is the assignee and the
//! one before it is the case number.

use crate::config::consts::{LISTING_ROWS_CSS, LISTING_TABLE_ID};
use crate::core::sanitize::normalize_ws;
use crate::driver::{Browser, Locator};
use crate::error::BrowserResult;

/// One (case number, assignee) pair read from a listing row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sighting {
    pub case_number: String,
    pub assignee: String,
}

/// Why a row produced no sighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowSkip {
    TooFewLinks(usize),
    EmptyCaseNumber,
    EmptyAssignee,
}

/// Pure core: one row's link texts, in document order.
pub fn sighting_from_links(links: &[String]) -> Result<Sighting, RowSkip> {
    let n = links.len();
    if n < 2 {
        return Err(RowSkip::TooFewLinks(n));
    }
    let case_number = normalize_ws(&links[n - 2]);
    let assignee = normalize_ws(&links[n - 1]);
    if case_number.is_empty() {
        return Err(RowSkip::EmptyCaseNumber);
    }
    if assignee.is_empty() {
        return Err(RowSkip::EmptyAssignee);
    }
    Ok(Sighting { case_number, assignee })
}

/// Sightings from every row, in row order. Skipped rows are logged.
pub fn extract_rows<I>(rows: I) -> Vec<Sighting>
where
    I: IntoIterator<Item = Vec<String>>,
{
    extract_numbered_rows(rows.into_iter().enumerate().map(|(i, links)| (i + 1, links)))
}

/// Like [`extract_rows`], for rows that carry their 1-based table position.
/// Gaps are allowed; skip warnings name the given position.
pub fn extract_numbered_rows<I>(rows: I) -> Vec<Sighting>
where
    I: IntoIterator<Item = (usize, Vec<String>)>,
{
    let mut out = Vec::new();
    for (row, links) in rows {
        match sighting_from_links(&links) {
            Ok(s) => out.push(s),
            Err(skip) => logw!(row, ?skip, "listing row skipped"),
        }
    }
    out
}

/// Read the current page's listing. A missing table is an empty page.
pub fn extract_page<B: Browser + ?Sized>(browser: &mut B) -> BrowserResult<Vec<Sighting>> {
    let Some(table) = browser.find(None, &Locator::id(LISTING_TABLE_ID))? else {
        logw!("listing table #{LISTING_TABLE_ID} not found on this page");
        return Ok(Vec::new());
    };
    let rows = browser.find_all(Some(&table), &Locator::css(LISTING_ROWS_CSS))?;

    let mut texts = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match row_link_texts(browser, row) {
            Ok(links) => texts.push((i + 1, links)),
            Err(e) => loge!(row = i + 1, "cannot read listing row: {e}"),
        }
    }
    let found = extract_numbered_rows(texts);
    logd!(rows = rows.len(), sightings = found.len(), "page extracted");
    Ok(found)
}

fn row_link_texts<B: Browser + ?Sized>(browser: &mut B, row: &B::Element) -> BrowserResult<Vec<String>> {
    let links = browser.find_all(Some(row), &Locator::tag("a"))?;
    links.iter().map(|a| browser.text(a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::snapshot::SnapshotBrowser;
    use tracing_test::traced_test;

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn last_two_links_are_case_and_assignee() {
        let s = sighting_from_links(&links(&["ícone", " 1000.000001/2024-01 ", "a@x.org\n"])).unwrap();
        assert_eq!(s.case_number, "1000.000001/2024-01");
        assert_eq!(s.assignee, "a@x.org");
    }

    #[test]
    fn empty_fields_are_reported() {
        assert_eq!(sighting_from_links(&links(&["  ", "a@x.org"])), Err(RowSkip::EmptyCaseNumber));
        assert_eq!(sighting_from_links(&links(&["1", "\u{a0}"])), Err(RowSkip::EmptyAssignee));
        assert_eq!(sighting_from_links(&links(&["1"])), Err(RowSkip::TooFewLinks(1)));
    }

    #[test]
    fn rows_keep_their_order() {
        let got = extract_rows(vec![
            links(&["3", "c@x.org"]),
            links(&["1", "a@x.org"]),
            links(&["2", "b@x.org"]),
        ]);
        let numbers: Vec<_> = got.iter().map(|s| s.case_number.as_str()).collect();
        assert_eq!(numbers, ["3", "1", "2"]);
    }

    #[traced_test]
    #[test]
    fn short_rows_are_skipped_with_a_warning() {
        let got = extract_rows(vec![links(&["only-one"]), links(&["1", "a@x.org"]), vec![]]);
        assert_eq!(got.len(), 1);
        assert!(logs_contain("listing row skipped"));
        assert!(logs_contain("TooFewLinks(1)"));
        assert!(logs_contain("TooFewLinks(0)"));
    }

    #[traced_test]
    #[test]
    fn missing_table_is_an_empty_page() {
        let mut b = SnapshotBrowser::from_pages(["<html><body><p>Nenhum processo</p></body></html>"]);
        let got = extract_page(&mut b).unwrap();
        assert!(got.is_empty());
        assert!(logs_contain("listing table #tblProcessosDetalhado not found"));
    }

    #[test]
    fn page_rows_come_from_the_listing_body_only() {
        let page = r#"<html><body><table id="tblProcessosDetalhado">
            <thead><tr><th><a href="javascript:void(0)">Processo</a></th><th><a href="javascript:void(0)">Atribuído</a></th></tr></thead>
            <tbody>
              <tr><td><a href="p1">1000.000001/2024-01</a></td><td><a href="u">a@x.org</a></td></tr>
              <tr><td>sem links</td></tr>
            </tbody></table></body></html>"#;
        let mut b = SnapshotBrowser::from_pages([page]);
        let got = extract_page(&mut b).unwrap();
        assert_eq!(got, vec![Sighting { case_number: s!("1000.000001/2024-01"), assignee: s!("a@x.org") }]);
    }

    /// Snapshot whose link text goes stale for one given text.
    struct StaleText {
        inner: SnapshotBrowser,
        poison: &'static str,
    }

    impl Browser for StaleText {
        type Element = <SnapshotBrowser as Browser>::Element;

        fn goto(&mut self, url: &str) -> BrowserResult<()> { self.inner.goto(url) }
        fn current_url(&mut self) -> BrowserResult<String> { self.inner.current_url() }
        fn find_all(&mut self, scope: Option<&Self::Element>, locator: &Locator) -> BrowserResult<Vec<Self::Element>> {
            self.inner.find_all(scope, locator)
        }
        fn text(&mut self, el: &Self::Element) -> BrowserResult<String> {
            let t = self.inner.text(el)?;
            if t.trim() == self.poison {
                return Err(crate::error::BrowserError::Stale(t));
            }
            Ok(t)
        }
        fn click(&mut self, el: &Self::Element) -> BrowserResult<()> { self.inner.click(el) }
        fn send_keys(&mut self, el: &Self::Element, text: &str) -> BrowserResult<()> { self.inner.send_keys(el, text) }
        fn is_selected(&mut self, el: &Self::Element) -> BrowserResult<bool> { self.inner.is_selected(el) }
        fn enter_frame(&mut self, frame: &Self::Element) -> BrowserResult<()> { self.inner.enter_frame(frame) }
        fn leave_frames(&mut self) -> BrowserResult<()> { self.inner.leave_frames() }
        fn execute(&mut self, script: &str, arg: Option<&Self::Element>) -> BrowserResult<()> {
            self.inner.execute(script, arg)
        }
        fn refresh(&mut self) -> BrowserResult<()> { self.inner.refresh() }
        fn accept_alert(&mut self) -> BrowserResult<bool> { self.inner.accept_alert() }
    }

    #[traced_test]
    #[test]
    fn unreadable_row_is_skipped_and_later_rows_keep_their_number() {
        let page = r#"<html><body><table id="tblProcessosDetalhado"><tbody>
              <tr><td><a href="p1">1</a></td><td><a href="u">a@x.org</a></td></tr>
              <tr><td><a href="p2">GONE</a></td><td><a href="u">b@x.org</a></td></tr>
              <tr><td><a href="p3">3</a></td><td><a href="u">c@x.org</a></td></tr>
              <tr><td>sem links</td></tr>
            </tbody></table></body></html>"#;
        let mut b = StaleText { inner: SnapshotBrowser::from_pages([page]), poison: "GONE" };
        let got = extract_page(&mut b).unwrap();

        let numbers: Vec<_> = got.iter().map(|s| s.case_number.as_str()).collect();
        assert_eq!(numbers, ["1", "3"]);
        assert!(logs_contain("row=2"));
        assert!(logs_contain("cannot read listing row"));
        // The link-less row is the fourth in the table, not the third readable one.
        assert!(logs_contain("row=4"));
        assert!(!logs_contain("row=3"));
    }
}
