//! Network side of votehud
//!
//! This crate provides:
//! - The [`CooldownSource`] seam the scheduler fetches through
//! - [`FetchClient`], the HTTP implementation against the vote endpoint
//! - [`PollScheduler`], which polls while connected to the vote service
//!   and publishes each result into the shared snapshot cell

mod client;
mod mock;
mod scheduler;
mod source;

pub use client::*;
pub use mock::*;
pub use scheduler::*;
pub use source::*;

use thiserror::Error;
use votehud_api::WireError;

/// Fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error(transparent)]
    Malformed(#[from] WireError),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

pub type FetchResult<T> = Result<T, FetchError>;
