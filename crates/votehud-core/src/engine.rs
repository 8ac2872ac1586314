//! Frame entry point

use std::sync::{Arc, PoisonError};
use tracing::{debug, warn};
use votehud_api::{CooldownStore, ServiceMatcher, SiteCatalog};
use votehud_config::{FlushOutcome, SharedPreferences};
use votehud_host_api::{Argb, Host, Surface};
use votehud_util::EpochMillis;

use crate::{
    AlertEvent, AvailabilityTracker, CONFIG_VIEW_NAME, Compass, HudEvent, InputRouter, LayoutInput,
    RenderPlan, StyleLayout,
};

/// How long the centered alert message stays up
pub const CENTER_MESSAGE_DURATION_MS: i64 = 3_000;

pub const CENTER_MESSAGE_COLOR: Argb = Argb::from_rgb(0xFFFF55);

pub const ALERT_TITLE: &str = "Vote available!";

/// What one frame did
#[derive(Debug)]
pub struct FrameReport {
    pub events: Vec<HudEvent>,
    /// The overlay drawn this frame, if any
    pub plan: Option<RenderPlan>,
    pub flush: FlushOutcome,
}

impl FrameReport {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            plan: None,
            flush: FlushOutcome::Clean,
        }
    }
}

#[derive(Debug)]
struct CenterMessage {
    text: String,
    started_at: EpochMillis,
}

/// Owns all tick-side state and runs one frame at a time.
///
/// Each frame: route input into preferences, fold the current cooldown
/// snapshot into the tracker, lay out and draw the overlay, draw the
/// compass, then give the preference store a chance to flush. The flush
/// runs on every frame, including hidden ones.
pub struct VoteHudEngine {
    prefs: SharedPreferences,
    matcher: ServiceMatcher,
    catalog: SiteCatalog,
    tracker: AvailabilityTracker,
    router: InputRouter,
    compass: Compass,
    screenshot_frames: u32,
    center_message: Option<CenterMessage>,
}

impl VoteHudEngine {
    pub fn new(prefs: SharedPreferences, matcher: ServiceMatcher, catalog: SiteCatalog) -> Self {
        Self {
            prefs,
            matcher,
            catalog,
            tracker: AvailabilityTracker::new(),
            router: InputRouter::new(),
            compass: Compass::new(),
            screenshot_frames: 0,
            center_message: None,
        }
    }

    pub fn preferences(&self) -> &SharedPreferences {
        &self.prefs
    }

    pub fn tracker(&self) -> &AvailabilityTracker {
        &self.tracker
    }

    pub fn hud_visible(&self) -> bool {
        self.router.hud_visible()
    }

    pub fn shortcuts_enabled(&self) -> bool {
        self.router.shortcuts_enabled()
    }

    /// Whether the overlay is currently hidden for a screenshot
    pub fn hidden_for_screenshot(&self) -> bool {
        self.screenshot_frames > 0
    }

    /// Run one display frame
    pub fn frame<H: Host>(
        &mut self,
        host: &mut H,
        store: &CooldownStore,
        now: EpochMillis,
    ) -> FrameReport {
        let prefs_handle = Arc::clone(&self.prefs);
        let mut prefs = prefs_handle.lock().unwrap_or_else(PoisonError::into_inner);
        let mut report = FrameReport::new();

        if self.screenshot_frames > 0 {
            self.screenshot_frames -= 1;
            report.flush = prefs.flush_if_due(now);
            return report;
        }

        let events = self.router.route(host.pressed_actions(), &mut prefs, now);
        for event in &events {
            match event {
                HudEvent::ConfigViewRequested => {
                    if let Err(e) = host.open_config_view(CONFIG_VIEW_NAME) {
                        warn!(error = %e, "Could not open configuration view");
                    }
                }
                HudEvent::ScreenshotHide { frames } => {
                    debug!(frames, "Hiding overlay for screenshot");
                    self.screenshot_frames = *frames;
                }
                _ => {}
            }
        }
        report.events.extend(events);

        let on_service =
            host.in_world() && self.matcher.matches_current(host.current_address().as_deref());
        if !on_service || self.screenshot_frames > 0 {
            report.flush = prefs.flush_if_due(now);
            return report;
        }

        for alert in self.tracker.update(store, now, &self.catalog) {
            self.announce(host, &alert, now);
            report.events.push(HudEvent::VoteAvailable(alert));
        }

        if self.router.hud_visible() {
            let input = LayoutInput {
                store,
                prefs: prefs.preferences(),
                tracker: &self.tracker,
                catalog: &self.catalog,
                now,
                viewport: host.viewport(),
            };
            let plan = prefs.preferences().style().layout(&input, &*host);
            plan.render(host);
            report.plan = Some(plan);

            self.draw_center_message(host, now);
        }

        report.flush = prefs.flush_if_due(now);

        if let Some(event) = self.compass.frame(host, &mut prefs, now) {
            report.events.push(event);
        }

        report
    }

    fn announce<H: Host>(&mut self, host: &mut H, alert: &AlertEvent, now: EpochMillis) {
        let capabilities = host.capabilities();
        if capabilities.can_play_cue {
            host.play_cue();
        }
        if capabilities.can_show_title {
            host.show_title(ALERT_TITLE, &alert.label);
        }

        self.center_message = Some(CenterMessage {
            text: format!("{} on {}", ALERT_TITLE, alert.label),
            started_at: now,
        });
    }

    fn draw_center_message<H: Host>(&mut self, host: &mut H, now: EpochMillis) {
        let Some(message) = &self.center_message else {
            return;
        };
        if now - message.started_at >= CENTER_MESSAGE_DURATION_MS {
            self.center_message = None;
            return;
        }

        let viewport = host.viewport();
        let width = Surface::text_width(&*host, &message.text);
        host.draw_text(
            &message.text,
            (viewport.width - width) / 2,
            viewport.height / 2,
            CENTER_MESSAGE_COLOR,
            true,
        );
    }
}
