// src/core/mod.rs

pub mod pause;
pub mod retry;
pub mod sanitize;
