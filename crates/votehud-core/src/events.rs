//! Events emitted by the engine during a frame

use votehud_config::{HudAnchor, HudStyle};

use crate::AlertEvent;

/// Something that happened during a frame
#[derive(Debug, Clone, PartialEq)]
pub enum HudEvent {
    /// A site became available
    VoteAvailable(AlertEvent),

    /// Overlay visibility was toggled
    HudToggled { visible: bool },

    /// Overlay scale changed
    ScaleChanged { scale: f32 },

    /// Style was cycled
    StyleChanged { style: HudStyle },

    /// Anchor was cycled
    AnchorChanged { anchor: HudAnchor },

    /// Shortcut suppression was armed or disarmed
    ShortcutsToggled { enabled: bool },

    /// The configuration view was requested
    ConfigViewRequested,

    /// Overlay hidden for a screenshot
    ScreenshotHide { frames: u32 },

    /// The compass was clicked; `message` is what was sent, if anything
    VoteMessageSent { message: Option<String> },
}
