// src/progress.rs
/// Lightweight progress reporting used by long-running operations (capture/cycle).
/// Frontends (CLI) implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of boxes (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called after each listing page is persisted.
    fn page_done(&mut self, _box_name: &str, _page: u32, _sightings: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Reborrow an optional sink for a nested call, keeping the outer one usable.
pub fn reborrow<'a>(progress: &'a mut Option<&mut dyn Progress>) -> Option<&'a mut dyn Progress> {
    match progress {
        Some(p) => Some(&mut **p),
        None => None,
    }
}
