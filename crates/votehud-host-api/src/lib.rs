//! Host collaborator interfaces for votehud
//!
//! This crate defines the seam between the overlay engine and whatever
//! renders it: drawing, input, connection state and one-shot side effects.
//! It contains no platform code itself.

mod capabilities;
mod geometry;
mod input;
mod mock;
mod traits;

pub use capabilities::*;
pub use geometry::*;
pub use input::*;
pub use mock::*;
pub use traits::*;
