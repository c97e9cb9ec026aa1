// src/driver/snapshot.rs
//! Offline [`Browser`] over saved listing pages.
//!
//! Each saved page is one document. Clicking a next-page control (an element,
//! or a descendant of an element, whose id is registered as a next control)
//! moves to the following document; handles from the previous document turn
//! stale, as they would in a real browser. XPath locators are not supported.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use scraper::{ElementRef, Html, Selector};

use super::{Browser, Locator};
use crate::config::consts::{NEXT_PAGE_BOTTOM_ID, NEXT_PAGE_TOP_ID};
use crate::core::sanitize::normalize_ws;
use crate::error::{BrowserError, BrowserResult};

/// Element handle: document index plus position in document order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapElement {
    page: usize,
    index: usize,
}

pub struct SnapshotBrowser {
    pages: Vec<(String, Html)>,
    current: usize,
    next_ids: Vec<String>,
    any: Selector,
    toggled: HashSet<SnapElement>,
    in_frame: bool,
    scripts: Vec<String>,
    typed: Vec<String>,
    visited: Vec<String>,
}

impl SnapshotBrowser {
    /// Pages in listing order, labelled `page-1`, `page-2`, ...
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, html)| (format!("page-{}", i + 1), Html::parse_document(html.as_ref())))
            .collect();
        Self::with_documents(pages)
    }

    /// Load saved pages from disk, in the given order.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> io::Result<Self> {
        let mut pages = Vec::with_capacity(paths.len());
        for p in paths {
            let p = p.as_ref();
            let html = fs::read_to_string(p)?;
            pages.push((p.display().to_string(), Html::parse_document(&html)));
        }
        Ok(Self::with_documents(pages))
    }

    fn with_documents(pages: Vec<(String, Html)>) -> Self {
        Self {
            pages,
            current: 0,
            next_ids: vec![s!(NEXT_PAGE_TOP_ID), s!(NEXT_PAGE_BOTTOM_ID)],
            // "*" always parses
            any: Selector::parse("*").unwrap_or_else(|_| unreachable!()),
            toggled: HashSet::new(),
            in_frame: false,
            scripts: Vec::new(),
            typed: Vec::new(),
            visited: Vec::new(),
        }
    }

    /// Replace the ids treated as next-page controls.
    pub fn with_next_controls(mut self, ids: &[&str]) -> Self {
        self.next_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn page_count(&self) -> usize { self.pages.len() }

    /// Zero-based index of the document currently shown.
    pub fn current_page(&self) -> usize { self.current }

    pub fn in_top_level(&self) -> bool { !self.in_frame }

    /// Scripts run so far, in order.
    pub fn scripts(&self) -> &[String] { &self.scripts }

    /// Text typed into fields so far, in order.
    pub fn typed(&self) -> &[String] { &self.typed }

    /// URLs passed to `goto`.
    pub fn visited(&self) -> &[String] { &self.visited }

    fn doc(&self, page: usize) -> BrowserResult<&Html> {
        self.pages
            .get(page)
            .map(|(_, html)| html)
            .ok_or_else(|| BrowserError::Transport(format!("no snapshot page {page}")))
    }

    fn resolve(&self, el: &SnapElement) -> BrowserResult<ElementRef<'_>> {
        if el.page != self.current {
            return Err(BrowserError::Stale(format!("element from page {} after navigation", el.page + 1)));
        }
        self.doc(el.page)?
            .select(&self.any)
            .nth(el.index)
            .ok_or_else(|| BrowserError::Stale(format!("element #{} vanished", el.index)))
    }

    fn handle_of(&self, page: usize, target: ElementRef<'_>) -> Option<SnapElement> {
        let html = self.doc(page).ok()?;
        html.select(&self.any)
            .position(|e| e == target)
            .map(|index| SnapElement { page, index })
    }

    fn is_next_control(&self, el: ElementRef<'_>) -> bool {
        let mut node = Some(el);
        while let Some(e) = node {
            if let Some(id) = e.value().id() {
                if self.next_ids.iter().any(|n| n == id) {
                    return true;
                }
            }
            node = e.parent().and_then(ElementRef::wrap);
        }
        false
    }
}

impl Browser for SnapshotBrowser {
    type Element = SnapElement;

    fn goto(&mut self, url: &str) -> BrowserResult<()> {
        self.visited.push(s!(url));
        Ok(())
    }

    fn current_url(&mut self) -> BrowserResult<String> {
        let label = self.pages.get(self.current).map(|(l, _)| l.as_str()).unwrap_or("empty");
        Ok(format!("snapshot://{label}"))
    }

    fn find_all(&mut self, scope: Option<&SnapElement>, locator: &Locator) -> BrowserResult<Vec<SnapElement>> {
        let page = self.current;
        let found: Vec<ElementRef<'_>> = {
            let root = match scope {
                Some(el) => self.resolve(el)?,
                None => self.doc(page)?.root_element(),
            };
            match locator {
                Locator::XPath(_) => return Err(BrowserError::Unsupported(locator.clone())),
                Locator::LinkText(text) => {
                    let anchors = Selector::parse("a").map_err(|_| BrowserError::Unsupported(locator.clone()))?;
                    root.select(&anchors)
                        .filter(|a| normalize_ws(&a.text().collect::<String>()) == *text)
                        .collect()
                }
                other => {
                    let css = other.to_css().unwrap_or_default();
                    let sel = Selector::parse(&css).map_err(|_| BrowserError::Unsupported(locator.clone()))?;
                    root.select(&sel).collect()
                }
            }
        };
        Ok(found.into_iter().filter_map(|e| self.handle_of(page, e)).collect())
    }

    fn text(&mut self, el: &SnapElement) -> BrowserResult<String> {
        let e = self.resolve(el)?;
        Ok(normalize_ws(&e.text().collect::<String>()))
    }

    fn click(&mut self, el: &SnapElement) -> BrowserResult<()> {
        let (advance, checkbox) = {
            let e = self.resolve(el)?;
            let checkbox = e.value().name() == "input"
                && matches!(e.value().attr("type"), Some("checkbox") | Some("radio"));
            (self.is_next_control(e), checkbox)
        };
        if advance {
            if self.current + 1 < self.pages.len() {
                self.current += 1;
            } else {
                logd!("snapshot: next control clicked on the last page; staying");
            }
        } else if checkbox && !self.toggled.remove(el) {
            self.toggled.insert(el.clone());
        }
        Ok(())
    }

    fn send_keys(&mut self, el: &SnapElement, text: &str) -> BrowserResult<()> {
        self.resolve(el)?;
        self.typed.push(s!(text));
        Ok(())
    }

    fn is_selected(&mut self, el: &SnapElement) -> BrowserResult<bool> {
        let checked = self.resolve(el)?.value().attr("checked").is_some();
        Ok(checked != self.toggled.contains(el))
    }

    fn enter_frame(&mut self, frame: &SnapElement) -> BrowserResult<()> {
        self.resolve(frame)?;
        self.in_frame = true;
        Ok(())
    }

    fn leave_frames(&mut self) -> BrowserResult<()> {
        self.in_frame = false;
        Ok(())
    }

    fn execute(&mut self, script: &str, arg: Option<&SnapElement>) -> BrowserResult<()> {
        self.scripts.push(s!(script));
        match arg {
            Some(el) if script.contains(".click()") => self.click(el),
            _ => Ok(()),
        }
    }

    fn refresh(&mut self) -> BrowserResult<()> {
        Ok(())
    }

    fn accept_alert(&mut self) -> BrowserResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <a id="lnkInfraProximaPaginaSuperior" href="javascript:void(0)"><img src="next.svg"></a>
        <table id="t"><tbody>
          <tr><td><a href="a">  One  </a></td></tr>
          <tr><td><a href="b">Two</a></td></tr>
        </tbody></table>
        <input type="checkbox" class="infraCheckboxInput" checked>
      </body></html>"#;

    #[test]
    fn finds_scoped_elements_in_document_order() {
        let mut b = SnapshotBrowser::from_pages([PAGE]);
        let table = b.find(None, &Locator::id("t")).unwrap().unwrap();
        let links = b.find_all(Some(&table), &Locator::tag("a")).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(b.text(&links[0]).unwrap(), "One");
        assert_eq!(b.text(&links[1]).unwrap(), "Two");
    }

    #[test]
    fn clicking_next_image_advances_and_stales_old_handles() {
        let mut b = SnapshotBrowser::from_pages([PAGE, "<html><body><table id=\"t\"></table></body></html>"]);
        let img = b.find(None, &Locator::css("#lnkInfraProximaPaginaSuperior img")).unwrap().unwrap();
        let table = b.find(None, &Locator::id("t")).unwrap().unwrap();
        b.click(&img).unwrap();
        assert_eq!(b.current_page(), 1);
        assert!(matches!(b.text(&table), Err(BrowserError::Stale(_))));
    }

    #[test]
    fn checkbox_clicks_toggle_selection() {
        let mut b = SnapshotBrowser::from_pages([PAGE]);
        let cb = b.find(None, &Locator::class("infraCheckboxInput")).unwrap().unwrap();
        assert!(b.is_selected(&cb).unwrap());
        b.js_click(&cb).unwrap();
        assert!(!b.is_selected(&cb).unwrap());
    }

    #[test]
    fn xpath_is_rejected() {
        let mut b = SnapshotBrowser::from_pages([PAGE]);
        assert!(matches!(b.find_all(None, &Locator::xpath("//a")), Err(BrowserError::Unsupported(_))));
    }

    #[test]
    fn link_text_matches_normalized_text() {
        let mut b = SnapshotBrowser::from_pages([PAGE]);
        assert_eq!(b.find_all(None, &Locator::link_text("One")).unwrap().len(), 1);
    }
}
