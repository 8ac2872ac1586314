//! Availability tracking and presentation engine for votehud
//!
//! This crate is the tick-side heart of votehud, containing:
//! - Per-site availability transitions and one-shot alerts
//! - Style-driven layout (lines, colors, panel, anchor-resolved position)
//! - The compass indicator and its click action
//! - Input routing into preference changes and overlay toggles
//! - The frame entry point tying them together

mod anchor;
mod compass;
mod config_view;
mod engine;
mod events;
mod input;
mod layout;
mod palette;
mod tracker;

pub use anchor::*;
pub use compass::*;
pub use config_view::*;
pub use engine::*;
pub use events::*;
pub use input::*;
pub use layout::*;
pub use palette::*;
pub use tracker::*;
