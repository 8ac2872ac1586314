//! Shared types for votehud
//!
//! This crate defines:
//! - Site identifiers and the human-readable site catalog
//! - The cooldown snapshot published by each fetch
//! - The vote endpoint wire format
//! - Recognition of the vote service's server addresses
//! - The single-slot cell carrying the latest snapshot across threads

mod cooldown;
mod ids;
mod server;
mod shared;
mod sites;
mod wire;

pub use cooldown::*;
pub use ids::*;
pub use server::*;
pub use shared::*;
pub use sites::*;
pub use wire::*;
