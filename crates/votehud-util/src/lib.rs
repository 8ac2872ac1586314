//! Shared utilities for votehud
//!
//! This crate provides:
//! - Wall-clock time in epoch milliseconds (with a debug-build mock clock)
//! - Countdown formatting helpers
//! - Default paths for the preferences file

mod paths;
mod time;

pub use paths::*;
pub use time::*;
