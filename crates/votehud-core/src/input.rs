//! Input routing

use tracing::debug;
use votehud_config::PreferenceStore;
use votehud_host_api::InputActions;
use votehud_util::EpochMillis;

use crate::HudEvent;

/// Frames the overlay stays hidden after a screenshot press
pub const SCREENSHOT_HIDE_FRAMES: u32 = 20;

/// Turns pressed actions into preference changes and overlay state.
///
/// The disable-shortcuts action toggles suppression and consumes the
/// frame; while suppressed every other action is ignored.
#[derive(Debug)]
pub struct InputRouter {
    shortcuts_enabled: bool,
    hud_visible: bool,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self {
            shortcuts_enabled: true,
            hud_visible: true,
        }
    }
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hud_visible(&self) -> bool {
        self.hud_visible
    }

    pub fn shortcuts_enabled(&self) -> bool {
        self.shortcuts_enabled
    }

    /// Apply one frame's worth of pressed actions
    pub fn route(
        &mut self,
        pressed: InputActions,
        prefs: &mut PreferenceStore,
        now: EpochMillis,
    ) -> Vec<HudEvent> {
        let mut events = Vec::new();
        if pressed.is_empty() {
            return events;
        }

        if pressed.contains(InputActions::DISABLE_SHORTCUTS) {
            self.shortcuts_enabled = !self.shortcuts_enabled;
            debug!(enabled = self.shortcuts_enabled, "Shortcuts toggled");
            events.push(HudEvent::ShortcutsToggled {
                enabled: self.shortcuts_enabled,
            });
            return events;
        }
        if !self.shortcuts_enabled {
            return events;
        }

        if pressed.contains(InputActions::TOGGLE_HUD) {
            self.hud_visible = !self.hud_visible;
            events.push(HudEvent::HudToggled {
                visible: self.hud_visible,
            });
        }

        let steps = i32::from(pressed.contains(InputActions::INCREASE_SCALE))
            - i32::from(pressed.contains(InputActions::DECREASE_SCALE));
        if pressed.intersects(InputActions::INCREASE_SCALE | InputActions::DECREASE_SCALE) {
            prefs.adjust_scale(steps, now);
            events.push(HudEvent::ScaleChanged {
                scale: prefs.preferences().hud_scale(),
            });
        }

        if pressed.contains(InputActions::CYCLE_STYLE) {
            let style = prefs.cycle_style(now);
            events.push(HudEvent::StyleChanged { style });
        }

        if pressed.contains(InputActions::CYCLE_ANCHOR) {
            let anchor = prefs.cycle_anchor(now);
            events.push(HudEvent::AnchorChanged { anchor });
        }

        if pressed.contains(InputActions::OPEN_CONFIG) {
            events.push(HudEvent::ConfigViewRequested);
        }

        if pressed.contains(InputActions::SCREENSHOT) {
            events.push(HudEvent::ScreenshotHide {
                frames: SCREENSHOT_HIDE_FRAMES,
            });
        }

        events
    }
}
