//! Host collaborator traits

use thiserror::Error;

use crate::{Argb, CursorPos, HostCapabilities, InputActions, Rect, Viewport};

/// Errors from host side effects
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Not supported by this host: {0}")]
    Unsupported(&'static str),

    #[error("Host operation failed: {0}")]
    Failed(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Drawing surface for one frame.
///
/// Coordinates are GUI units. `push_scale` multiplies every later draw call
/// by the given factor until the matching `pop_scale`.
pub trait Surface {
    fn viewport(&self) -> Viewport;

    /// Width of `text` in unscaled GUI units
    fn text_width(&self, text: &str) -> i32;

    fn font_height(&self) -> i32;

    fn fill_rect(&mut self, rect: Rect, color: Argb);

    /// One-unit outline just inside `rect`
    fn draw_border(&mut self, rect: Rect, color: Argb);

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Argb, shadow: bool);

    /// Draw a named item icon with its top-left corner at (x, y)
    fn draw_item(&mut self, item: &str, x: i32, y: i32);

    fn push_scale(&mut self, scale: f32);

    fn pop_scale(&mut self);
}

/// Per-frame input state
pub trait InputProbe {
    /// Actions newly pressed since the previous call
    fn pressed_actions(&mut self) -> InputActions;

    fn cursor(&self) -> CursorPos;

    /// Whether the primary mouse button is currently held
    fn primary_button_down(&self) -> bool;
}

/// Connection state and one-shot side effects
pub trait HostServices {
    fn capabilities(&self) -> HostCapabilities;

    /// Address of the server the player is connected to, if any
    fn current_address(&self) -> Option<String>;

    /// Whether a world is loaded
    fn in_world(&self) -> bool;

    /// Whether the chat input is open
    fn chat_open(&self) -> bool;

    fn play_cue(&mut self);

    fn show_title(&mut self, title: &str, subtitle: &str);

    fn open_config_view(&mut self, view: &str) -> HostResult<()>;

    fn send_chat_message(&mut self, message: &str) -> HostResult<()>;
}

/// Everything the engine needs from its host
pub trait Host: Surface + InputProbe + HostServices {}

impl<T: Surface + InputProbe + HostServices> Host for T {}
