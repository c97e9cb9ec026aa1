// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashSet;

use sei_capture::driver::snapshot::SnapshotBrowser;
use sei_capture::driver::{Browser, Locator};
use sei_capture::error::{BrowserError, BrowserResult};
use sei_capture::{CaseLedger, CaseRecord, CaseStore, StoreError};

/// One detailed-listing page as the portal renders it.
pub fn listing_page(rows: &[(&str, &str)], next: bool) -> String {
    let mut body = String::new();
    if next {
        body.push_str(r#"<a id="lnkInfraProximaPaginaSuperior" href="javascript:void(0)"><img src="infra_css/svg/proxima.svg" title="Próxima Página"></a>"#);
    }
    body.push_str(r#"<table id="tblProcessosDetalhado" class="infraTable"><thead><tr><th>Processo</th><th>Atribuição</th></tr></thead><tbody>"#);
    for (case, who) in rows {
        body.push_str(&format!(
            r#"<tr class="infraTrClara">
                 <td><input type="checkbox" class="infraCheckbox"></td>
                 <td><a href="javascript:void(0)" class="anotacao"><img src="anotacao.svg"></a></td>
                 <td><a href="controlador.php?acao=procedimento_trabalhar" class="processoVisualizado"> {case} </a></td>
                 <td><a href="javascript:void(0)" title="Atribuído para">{who}</a></td>
               </tr>"#
        ));
    }
    body.push_str("</tbody></table>");
    if next {
        body.push_str(r#"<a id="lnkInfraProximaPaginaInferior" href="javascript:void(0)">Próxima</a>"#);
    }
    format!("<html><body><div id=\"divInfraAreaTabela\">{body}</div></body></html>")
}

pub fn empty_page() -> String {
    s("<html><body><div id=\"divInfraAreaTabela\"><p>Nenhum registro encontrado.</p></div></body></html>")
}

fn s(v: &str) -> String {
    v.to_string()
}

/// Ledger wrapper that remembers every call made to it.
pub struct RecordingLedger {
    pub inner: CaseStore,
    pub batches: Vec<Vec<String>>,
    pub reconciled_with: Vec<HashSet<String>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self { inner: CaseStore::in_memory().unwrap(), batches: Vec::new(), reconciled_with: Vec::new() }
    }
}

impl CaseLedger for RecordingLedger {
    fn upsert(&mut self, records: &[CaseRecord]) -> Result<usize, StoreError> {
        self.batches.push(records.iter().map(|r| r.case_number.clone()).collect());
        self.inner.upsert(records)
    }

    fn mark_concluded(&mut self, current: &HashSet<String>) -> Result<usize, StoreError> {
        self.reconciled_with.push(current.clone());
        self.inner.mark_concluded(current)
    }
}

/// Snapshot browser whose next-page control goes stale a set number of times,
/// on lookup or on click.
pub struct StaleNext {
    pub inner: SnapshotBrowser,
    pub stale_lookups: u32,
    pub stale_clicks: u32,
    pub clicks: u32,
}

impl StaleNext {
    pub fn new(inner: SnapshotBrowser) -> Self {
        Self { inner, stale_lookups: 0, stale_clicks: 0, clicks: 0 }
    }
}

type El = <SnapshotBrowser as Browser>::Element;

impl Browser for StaleNext {
    type Element = El;

    fn goto(&mut self, url: &str) -> BrowserResult<()> { self.inner.goto(url) }
    fn current_url(&mut self) -> BrowserResult<String> { self.inner.current_url() }
    fn find_all(&mut self, scope: Option<&El>, locator: &Locator) -> BrowserResult<Vec<El>> {
        if self.stale_lookups > 0 && locator.to_string().contains("ProximaPagina") {
            self.stale_lookups -= 1;
            return Err(BrowserError::Stale(locator.to_string()));
        }
        self.inner.find_all(scope, locator)
    }
    fn text(&mut self, el: &El) -> BrowserResult<String> { self.inner.text(el) }
    fn click(&mut self, el: &El) -> BrowserResult<()> {
        self.clicks += 1;
        if self.stale_clicks > 0 {
            self.stale_clicks -= 1;
            return Err(BrowserError::Stale(s("next page control")));
        }
        self.inner.click(el)
    }
    fn send_keys(&mut self, el: &El, text: &str) -> BrowserResult<()> { self.inner.send_keys(el, text) }
    fn is_selected(&mut self, el: &El) -> BrowserResult<bool> { self.inner.is_selected(el) }
    fn enter_frame(&mut self, frame: &El) -> BrowserResult<()> { self.inner.enter_frame(frame) }
    fn leave_frames(&mut self) -> BrowserResult<()> { self.inner.leave_frames() }
    fn execute(&mut self, script: &str, arg: Option<&El>) -> BrowserResult<()> { self.inner.execute(script, arg) }
    fn refresh(&mut self) -> BrowserResult<()> { self.inner.refresh() }
    fn accept_alert(&mut self) -> BrowserResult<bool> { self.inner.accept_alert() }
}
