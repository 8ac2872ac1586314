//! Discrete input actions delivered by the host

use bitflags::bitflags;

bitflags! {
    /// Actions newly pressed during one frame.
    ///
    /// Hosts report each physical press once; holding a key does not repeat
    /// the action on later frames.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputActions: u16 {
        const TOGGLE_HUD = 1 << 0;
        const INCREASE_SCALE = 1 << 1;
        const DECREASE_SCALE = 1 << 2;
        const CYCLE_STYLE = 1 << 3;
        const CYCLE_ANCHOR = 1 << 4;
        const OPEN_CONFIG = 1 << 5;
        const DISABLE_SHORTCUTS = 1 << 6;
        const SCREENSHOT = 1 << 7;
    }
}

impl InputActions {
    /// Parse a single action name, as used by text-driven hosts
    pub fn parse_action(name: &str) -> Option<Self> {
        let action = match name.trim().to_ascii_lowercase().as_str() {
            "toggle" | "toggle-hud" => Self::TOGGLE_HUD,
            "+" | "scale-up" => Self::INCREASE_SCALE,
            "-" | "scale-down" => Self::DECREASE_SCALE,
            "style" | "cycle-style" => Self::CYCLE_STYLE,
            "anchor" | "cycle-anchor" => Self::CYCLE_ANCHOR,
            "config" | "open-config" => Self::OPEN_CONFIG,
            "shortcuts" | "disable-shortcuts" => Self::DISABLE_SHORTCUTS,
            "screenshot" => Self::SCREENSHOT,
            _ => return None,
        };
        Some(action)
    }
}

/// Mouse cursor position in GUI units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPos {
    pub x: i32,
    pub y: i32,
}

impl CursorPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
