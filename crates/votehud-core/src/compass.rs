//! Compass indicator
//!
//! A small always-on square near the chat input. Green when the vote timer
//! has run out, red with a countdown while it is cooling down. Clicking it
//! while ready (with chat open) sends the configured auto-message and
//! restarts the timer.

use tracing::{info, warn};
use votehud_config::PreferenceStore;
use votehud_host_api::{Argb, Host, Rect, Surface, Viewport};
use votehud_util::{EpochMillis, format_countdown};

use crate::HudEvent;

/// Side length of the compass square
pub const COMPASS_SIZE: i32 = 16;

/// Gap between the compass and the screen edge
pub const COMPASS_MARGIN: i32 = 4;

/// Extra height of the chat input above the font height
pub const CHAT_INPUT_EXTRA: i32 = 4;

pub const COMPASS_READY_COLOR: Argb = Argb(0xFF00_AA00);
pub const COMPASS_COOLDOWN_COLOR: Argb = Argb(0xAAFF_0000);

pub const COMPASS_ITEM: &str = "minecraft:compass";
pub const READY_TOOLTIP: &str = "Send vote message";
pub const COOLDOWN_TOOLTIP: &str = "On cooldown";

/// Where the compass sits: just above the chat input when it is open,
/// otherwise near the bottom of the viewport
pub fn compass_rect(viewport: Viewport, font_height: i32, chat_open: bool) -> Rect {
    let bottom_gap = if chat_open {
        font_height + CHAT_INPUT_EXTRA
    } else {
        0
    };
    let y = viewport.height - bottom_gap - COMPASS_SIZE - COMPASS_MARGIN;
    Rect::new(COMPASS_MARGIN, y, COMPASS_SIZE, COMPASS_SIZE)
}

/// Compass state carried between frames
#[derive(Debug, Default)]
pub struct Compass {
    was_button_down: bool,
}

impl Compass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the compass and handle a click on it
    pub fn frame<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        prefs: &mut PreferenceStore,
        now: EpochMillis,
    ) -> Option<HudEvent> {
        let font_height = host.font_height();
        let chat_open = host.chat_open();
        let rect = compass_rect(host.viewport(), font_height, chat_open);
        let ready = prefs.preferences().timer_ready(now);

        let background = if ready {
            COMPASS_READY_COLOR
        } else {
            COMPASS_COOLDOWN_COLOR
        };
        host.fill_rect(rect, background);

        if host.capabilities().can_draw_items {
            host.draw_item(COMPASS_ITEM, rect.x, rect.y);
        }

        if !ready {
            let countdown = format_countdown(prefs.preferences().timer_remaining(now));
            let width = Surface::text_width(&*host, &countdown);
            host.draw_text(
                &countdown,
                rect.x + (COMPASS_SIZE - width) / 2,
                rect.y + (COMPASS_SIZE - font_height) / 2,
                Argb::WHITE,
                true,
            );
        }

        let cursor = host.cursor();
        let hovered = rect.contains(cursor.x, cursor.y);
        if hovered {
            let tip = if ready { READY_TOOLTIP } else { COOLDOWN_TOOLTIP };
            host.draw_text(tip, rect.x, rect.y - font_height - 2, Argb::WHITE, true);
        }

        // Edge-triggered: act on the press, not while the button is held
        let button_down = host.primary_button_down();
        let pressed = button_down && !self.was_button_down;
        self.was_button_down = button_down;

        if !(pressed && ready && hovered && chat_open) {
            return None;
        }

        let message = prefs.preferences().auto_message().trim().to_string();
        let sent = if message.is_empty() {
            None
        } else {
            match host.send_chat_message(&message) {
                Ok(()) => Some(message),
                Err(e) => {
                    warn!(error = %e, "Failed to send vote message");
                    None
                }
            }
        };

        prefs.restart_timer(now);
        info!(sent = sent.is_some(), "Compass clicked, timer restarted");
        Some(HudEvent::VoteMessageSent { message: sent })
    }
}
