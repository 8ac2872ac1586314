//! Host capabilities model

use serde::{Deserialize, Serialize};

/// Describes which optional side effects a host supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// Can play a notification cue
    pub can_play_cue: bool,

    /// Can show a transient title/subtitle
    pub can_show_title: bool,

    /// Can draw item icons (otherwise text stands in)
    pub can_draw_items: bool,

    /// Can send chat messages on the player's behalf
    pub can_send_chat: bool,

    /// Can open a named configuration view
    pub can_open_config_view: bool,
}

impl HostCapabilities {
    /// Text-only host: drawing works, nothing else does
    pub fn minimal() -> Self {
        Self {
            can_play_cue: false,
            can_show_title: false,
            can_draw_items: false,
            can_send_chat: false,
            can_open_config_view: false,
        }
    }

    /// A host embedded in the game client
    pub fn full() -> Self {
        Self {
            can_play_cue: true,
            can_show_title: true,
            can_draw_items: true,
            can_send_chat: true,
            can_open_config_view: true,
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::minimal()
    }
}
