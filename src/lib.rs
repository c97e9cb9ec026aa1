// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod log;

pub mod capture;
pub mod driver;
pub mod progress;
pub mod report;
pub mod runner;
pub mod sei;
pub mod store;

pub use capture::{CaptureReport, capture_box};
pub use error::{BrowserError, CaptureError, StoreError};
pub use store::{CaseLedger, CaseRecord, CaseStore};
