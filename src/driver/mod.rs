// src/driver/mod.rs
//! # Browser boundary
//!
//! Everything the capture needs from a browser goes through [`Browser`]. The
//! session is a single serial resource: one tab, one cursor, one frame context.
//! It is always passed as `&mut` and never stored in a global.
//!
//! Frame context is part of the session state. Unless an operation says
//! otherwise it expects the top-level document on entry and leaves the session
//! there on exit.
//!
//! Implementations:
//! - [`webdriver::WebDriverSession`] drives a real browser over the W3C
//!   WebDriver protocol (chromedriver, geckodriver).
//! - [`snapshot::SnapshotBrowser`] walks saved HTML pages offline.

use std::fmt;

use crate::error::BrowserResult;

pub mod snapshot;
pub mod wait;
pub mod webdriver;

pub use wait::Wait;

/// How to find an element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Name(String),
    Class(String),
    Tag(String),
    Css(String),
    XPath(String),
    LinkText(String),
}

impl Locator {
    pub fn id(v: impl Into<String>) -> Self { Locator::Id(v.into()) }
    pub fn name(v: impl Into<String>) -> Self { Locator::Name(v.into()) }
    pub fn class(v: impl Into<String>) -> Self { Locator::Class(v.into()) }
    pub fn tag(v: impl Into<String>) -> Self { Locator::Tag(v.into()) }
    pub fn css(v: impl Into<String>) -> Self { Locator::Css(v.into()) }
    pub fn xpath(v: impl Into<String>) -> Self { Locator::XPath(v.into()) }
    pub fn link_text(v: impl Into<String>) -> Self { Locator::LinkText(v.into()) }

    /// CSS equivalent, when one exists.
    pub fn to_css(&self) -> Option<String> {
        match self {
            Locator::Id(v) => Some(format!("[id=\"{}\"]", escape_attr(v))),
            Locator::Name(v) => Some(format!("[name=\"{}\"]", escape_attr(v))),
            Locator::Class(v) => Some(format!(".{v}")),
            Locator::Tag(v) => Some(v.clone()),
            Locator::Css(v) => Some(v.clone()),
            Locator::XPath(_) | Locator::LinkText(_) => None,
        }
    }

    /// Frame lookup by `name` or `id` attribute.
    pub fn frame(name: &str) -> Self {
        let n = escape_attr(name);
        Locator::Css(format!(
            "iframe[name=\"{n}\"], frame[name=\"{n}\"], iframe[id=\"{n}\"], frame[id=\"{n}\"]"
        ))
    }
}

fn escape_attr(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={v}"),
            Locator::Name(v) => write!(f, "name={v}"),
            Locator::Class(v) => write!(f, "class={v}"),
            Locator::Tag(v) => write!(f, "tag={v}"),
            Locator::Css(v) => write!(f, "css={v}"),
            Locator::XPath(v) => write!(f, "xpath={v}"),
            Locator::LinkText(v) => write!(f, "link={v}"),
        }
    }
}

/// DOM query and interaction primitives over one browser session.
pub trait Browser {
    /// Opaque handle to an element of the current document.
    type Element: Clone + fmt::Debug;

    fn goto(&mut self, url: &str) -> BrowserResult<()>;

    fn current_url(&mut self) -> BrowserResult<String>;

    /// Every match, in document order, under `scope` or the whole document.
    /// No match is an empty vector, not an error.
    fn find_all(
        &mut self,
        scope: Option<&Self::Element>,
        locator: &Locator,
    ) -> BrowserResult<Vec<Self::Element>>;

    /// Rendered text of the element.
    fn text(&mut self, el: &Self::Element) -> BrowserResult<String>;

    fn click(&mut self, el: &Self::Element) -> BrowserResult<()>;

    fn send_keys(&mut self, el: &Self::Element, text: &str) -> BrowserResult<()>;

    fn is_selected(&mut self, el: &Self::Element) -> BrowserResult<bool>;

    /// Switch into a frame element of the current context.
    fn enter_frame(&mut self, frame: &Self::Element) -> BrowserResult<()>;

    /// Back to the top-level document.
    fn leave_frames(&mut self) -> BrowserResult<()>;

    /// Run a script; `arg`, when given, is `arguments[0]`.
    fn execute(&mut self, script: &str, arg: Option<&Self::Element>) -> BrowserResult<()>;

    fn refresh(&mut self) -> BrowserResult<()>;

    /// Accept a pending alert. `Ok(false)` when there is none.
    fn accept_alert(&mut self) -> BrowserResult<bool>;

    /// First match, if any.
    fn find(
        &mut self,
        scope: Option<&Self::Element>,
        locator: &Locator,
    ) -> BrowserResult<Option<Self::Element>> {
        Ok(self.find_all(scope, locator)?.into_iter().next())
    }

    /// Click through script, for controls hidden behind overlays.
    fn js_click(&mut self, el: &Self::Element) -> BrowserResult<()> {
        self.execute("arguments[0].click();", Some(el))
    }

    fn scroll_to_top(&mut self) -> BrowserResult<()> {
        self.execute("window.scrollTo(0, 0);", None)
    }

    fn scroll_to_bottom(&mut self) -> BrowserResult<()> {
        self.execute("window.scrollTo(0, document.body.scrollHeight);", None)
    }
}
