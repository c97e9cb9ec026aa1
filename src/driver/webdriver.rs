// src/driver/webdriver.rs
// Blocking W3C WebDriver client. One HTTP request per browser primitive.

use reqwest::Method;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Browser, Locator};
use crate::config::options::DriverOptions;
use crate::error::{BrowserError, BrowserResult};

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--window-size=1920,1080",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementId(String);

impl ElementId {
    fn wire(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }
}

#[derive(Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

pub struct WebDriverSession {
    client: Client,
    base: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    /// Open a new browser session on the configured endpoint.
    pub fn start(opts: &DriverOptions) -> BrowserResult<Self> {
        let client = Client::builder().timeout(opts.http_timeout).build()?;
        let base = opts.webdriver_url.trim_end_matches('/').to_string();

        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": chrome_args(opts.headless) }
                }
            }
        });
        let value = call(&client, Method::POST, &format!("{base}/session"), Some(body))?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Transport(s!("new session response without sessionId")))?
            .to_string();

        logf!(session = %session_id, endpoint = %base, "webdriver session started");
        Ok(Self { client, base, session_id, closed: false })
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Close the browser. Dropping the session does the same, best-effort.
    pub fn quit(mut self) -> BrowserResult<()> {
        self.closed = true;
        self.send(Method::DELETE, "", None).map(|_| ())
    }

    fn send(&self, method: Method, path: &str, body: Option<Value>) -> BrowserResult<Value> {
        let url = format!("{}/session/{}{}", self.base, self.session_id, path);
        call(&self.client, method, &url, body)
    }

    fn element_path(el: &ElementId, tail: &str) -> String {
        format!("/element/{}{}", el.0, tail)
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.send(Method::DELETE, "", None) {
                logw!("closing webdriver session {} failed: {e}", self.session_id);
            }
        }
    }
}

fn chrome_args(headless: bool) -> Vec<&'static str> {
    let mut args = CHROME_ARGS.to_vec();
    if headless {
        args.push("--headless=new");
    }
    args
}

fn call(client: &Client, method: Method, url: &str, body: Option<Value>) -> BrowserResult<Value> {
    let mut req = client.request(method.clone(), url);
    // W3C wants a JSON body on every POST, even an empty one.
    if method == Method::POST {
        req = req.json(&body.unwrap_or_else(|| json!({})));
    }
    let resp = req.send()?;
    let status = resp.status();
    let mut payload: Value = resp.json()?;
    let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    match serde_json::from_value::<WireError>(value) {
        Ok(err) => Err(map_wire_error(&err.error, err.message)),
        Err(_) => Err(BrowserError::Protocol { code: status.to_string(), message: s!("unparseable error body") }),
    }
}

/// WebDriver error codes onto the crate's error taxonomy.
pub fn map_wire_error(code: &str, message: String) -> BrowserError {
    match code {
        "stale element reference" => BrowserError::Stale(message),
        "no such frame" => BrowserError::NoFrame(message),
        "no such alert" => BrowserError::NoAlert,
        "timeout" | "script timeout" => BrowserError::Timeout { what: message, waited_ms: 0 },
        _ => BrowserError::Protocol { code: s!(code), message },
    }
}

fn strategy(locator: &Locator) -> (&'static str, String) {
    match locator {
        Locator::XPath(v) => ("xpath", v.clone()),
        Locator::LinkText(v) => ("link text", v.clone()),
        other => ("css selector", other.to_css().unwrap_or_default()),
    }
}

fn parse_element(v: &Value) -> Option<ElementId> {
    v.get(ELEMENT_KEY).and_then(Value::as_str).map(|s| ElementId(s.to_string()))
}

fn is_no_such_element(e: &BrowserError) -> bool {
    matches!(e, BrowserError::Protocol { code, .. } if code == "no such element")
}

impl Browser for WebDriverSession {
    type Element = ElementId;

    fn goto(&mut self, url: &str) -> BrowserResult<()> {
        self.send(Method::POST, "/url", Some(json!({ "url": url }))).map(|_| ())
    }

    fn current_url(&mut self) -> BrowserResult<String> {
        let v = self.send(Method::GET, "/url", None)?;
        Ok(v.as_str().unwrap_or_default().to_string())
    }

    fn find_all(&mut self, scope: Option<&ElementId>, locator: &Locator) -> BrowserResult<Vec<ElementId>> {
        let (using, value) = strategy(locator);
        let path = match scope {
            Some(el) => Self::element_path(el, "/elements"),
            None => s!("/elements"),
        };
        let v = self.send(Method::POST, &path, Some(json!({ "using": using, "value": value })))?;
        Ok(v.as_array().map(|a| a.iter().filter_map(parse_element).collect()).unwrap_or_default())
    }

    fn find(&mut self, scope: Option<&ElementId>, locator: &Locator) -> BrowserResult<Option<ElementId>> {
        let (using, value) = strategy(locator);
        let path = match scope {
            Some(el) => Self::element_path(el, "/element"),
            None => s!("/element"),
        };
        match self.send(Method::POST, &path, Some(json!({ "using": using, "value": value }))) {
            Ok(v) => Ok(parse_element(&v)),
            Err(e) if is_no_such_element(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn text(&mut self, el: &ElementId) -> BrowserResult<String> {
        let v = self.send(Method::GET, &Self::element_path(el, "/text"), None)?;
        Ok(v.as_str().unwrap_or_default().to_string())
    }

    fn click(&mut self, el: &ElementId) -> BrowserResult<()> {
        self.send(Method::POST, &Self::element_path(el, "/click"), None).map(|_| ())
    }

    fn send_keys(&mut self, el: &ElementId, text: &str) -> BrowserResult<()> {
        self.send(Method::POST, &Self::element_path(el, "/value"), Some(json!({ "text": text })))
            .map(|_| ())
    }

    fn is_selected(&mut self, el: &ElementId) -> BrowserResult<bool> {
        let v = self.send(Method::GET, &Self::element_path(el, "/selected"), None)?;
        Ok(v.as_bool().unwrap_or(false))
    }

    fn enter_frame(&mut self, frame: &ElementId) -> BrowserResult<()> {
        self.send(Method::POST, "/frame", Some(json!({ "id": frame.wire() }))).map(|_| ())
    }

    fn leave_frames(&mut self) -> BrowserResult<()> {
        self.send(Method::POST, "/frame", Some(json!({ "id": Value::Null }))).map(|_| ())
    }

    fn execute(&mut self, script: &str, arg: Option<&ElementId>) -> BrowserResult<()> {
        let args: Vec<Value> = arg.map(ElementId::wire).into_iter().collect();
        self.send(Method::POST, "/execute/sync", Some(json!({ "script": script, "args": args })))
            .map(|_| ())
    }

    fn refresh(&mut self) -> BrowserResult<()> {
        self.send(Method::POST, "/refresh", None).map(|_| ())
    }

    fn accept_alert(&mut self) -> BrowserResult<bool> {
        match self.send(Method::POST, "/alert/accept", None) {
            Ok(_) => Ok(true),
            Err(BrowserError::NoAlert) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
