//! Style-driven layout
//!
//! Each style turns the current cooldown snapshot into a [`RenderPlan`]:
//! the lines to draw with their colors, an optional background panel, and
//! the anchor-resolved origin. Plans are plain data, so every style can be
//! checked without a real renderer.

use votehud_api::{CooldownStore, SiteCatalog, SiteStatus};
use votehud_config::{HudStyle, Preferences};
use votehud_host_api::{Argb, Rect, Surface, Viewport};
use votehud_util::{EpochMillis, format_countdown};

use crate::{
    AvailabilityTracker, ERROR_COLOR, HUD_PADDING, LOADING_COLOR, gradient_color, rainbow_color,
    resolve_anchor,
};

/// Vertical advance between lines
pub const LINE_HEIGHT: i32 = 13;

/// Content width used when there is nothing to measure
pub const EMPTY_CONTENT_WIDTH: i32 = 100;

/// How far the dark panel extends past the content on its top-left
const PANEL_BLEED: i32 = 2;

pub const LOADING_TEXT: &str = "Loading votes...";
pub const ERROR_TEXT: &str = "Could not fetch votes";
pub const AVAILABLE_TEXT: &str = "Available";

/// Text measurement needed for layout
pub trait TextMetrics {
    fn text_width(&self, text: &str) -> i32;
}

impl<S: Surface + ?Sized> TextMetrics for S {
    fn text_width(&self, text: &str) -> i32 {
        Surface::text_width(self, text)
    }
}

/// Everything a style reads
#[derive(Clone, Copy)]
pub struct LayoutInput<'a> {
    pub store: &'a CooldownStore,
    pub prefs: &'a Preferences,
    pub tracker: &'a AvailabilityTracker,
    pub catalog: &'a SiteCatalog,
    pub now: EpochMillis,
    pub viewport: Viewport,
}

/// One line of overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct HudLine {
    pub text: String,
    pub color: Argb,
}

impl HudLine {
    pub fn new(text: impl Into<String>, color: Argb) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Background panel behind boxed styles, in pre-scale units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub rect: Rect,
    pub background: Argb,
    pub border: Argb,
}

/// Positioned, colored overlay content
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub style: HudStyle,
    pub scale: f32,
    /// Top-left of the content box, pre-scale
    pub origin: (i32, i32),
    /// Content box size, pre-scale
    pub width: i32,
    pub height: i32,
    pub panel: Option<Panel>,
    pub lines: Vec<HudLine>,
    /// Distance from the content box edge to the first line
    pub text_inset: i32,
    pub shadow: bool,
}

impl RenderPlan {
    /// Pre-scale position of each line
    pub fn line_positions(&self) -> impl Iterator<Item = (i32, i32, &HudLine)> {
        let (x, y) = self.origin;
        let inset = self.text_inset;
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (x + inset, y + inset + i as i32 * LINE_HEIGHT, line))
    }

    /// Draw the plan, wrapping it in the plan's scale
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.push_scale(self.scale);

        if let Some(panel) = &self.panel {
            surface.fill_rect(panel.rect, panel.background);
            surface.draw_border(panel.rect, panel.border);
        }
        for (x, y, line) in self.line_positions() {
            surface.draw_text(&line.text, x, y, line.color, self.shadow);
        }

        surface.pop_scale();
    }
}

/// A style's layout operation
pub trait StyleLayout {
    fn layout(&self, input: &LayoutInput<'_>, metrics: &dyn TextMetrics) -> RenderPlan;
}

impl StyleLayout for HudStyle {
    fn layout(&self, input: &LayoutInput<'_>, metrics: &dyn TextMetrics) -> RenderPlan {
        match self {
            HudStyle::CompactMinimal => compact_minimal(input, metrics),
            HudStyle::CompactSingleLine => compact_single_line(input, metrics),
            HudStyle::GradientByTime => boxed(*self, input, metrics, BoxedLook::DARK, |s| {
                gradient_color(s.remaining)
            }),
            HudStyle::RainbowCycle => boxed(*self, input, metrics, BoxedLook::DARK, |s| {
                rainbow_color(s.site, input.now)
            }),
            HudStyle::ReadableBoxed => boxed(*self, input, metrics, BoxedLook::LIGHT, |s| {
                availability_color(input.prefs, s.available)
            }),
            HudStyle::DefaultBoxed => boxed(*self, input, metrics, BoxedLook::DARK, |s| {
                availability_color(input.prefs, s.available)
            }),
        }
    }
}

fn availability_color(prefs: &Preferences, available: bool) -> Argb {
    if available {
        Argb::from_rgb(prefs.available_color())
    } else {
        Argb::from_rgb(prefs.unavailable_color())
    }
}

/// Loading or error line when there is no site data to show
fn status_line(store: &CooldownStore) -> Option<HudLine> {
    if !store.is_absent() {
        return None;
    }
    Some(if store.has_error() {
        HudLine::new(ERROR_TEXT, ERROR_COLOR)
    } else {
        HudLine::new(LOADING_TEXT, LOADING_COLOR)
    })
}

fn single_line(
    style: HudStyle,
    input: &LayoutInput<'_>,
    metrics: &dyn TextMetrics,
    line: HudLine,
) -> RenderPlan {
    let scale = input.prefs.hud_scale();
    let width = metrics.text_width(&line.text);
    let height = LINE_HEIGHT;
    let origin = resolve_anchor(
        input.viewport,
        scale,
        width,
        height,
        HUD_PADDING,
        input.prefs.anchor(),
    );

    RenderPlan {
        style,
        scale,
        origin,
        width,
        height,
        panel: None,
        lines: vec![line],
        text_inset: 0,
        shadow: false,
    }
}

fn nearest_text(input: &LayoutInput<'_>) -> String {
    input
        .store
        .nearest_reset(input.now)
        .map(|(_, remaining)| format_countdown(remaining))
        .unwrap_or_else(|| AVAILABLE_TEXT.to_string())
}

/// `12 | 04:59`
fn compact_minimal(input: &LayoutInput<'_>, metrics: &dyn TextMetrics) -> RenderPlan {
    let line = status_line(input.store).unwrap_or_else(|| {
        let text = format!(
            "{} | {}",
            input.store.total_votes_or_sentinel(),
            nearest_text(input)
        );
        HudLine::new(text, Argb::WHITE)
    });
    single_line(HudStyle::CompactMinimal, input, metrics, line)
}

/// `Votes 12 | Top Serveurs: 04:59`
fn compact_single_line(input: &LayoutInput<'_>, metrics: &dyn TextMetrics) -> RenderPlan {
    let line = status_line(input.store).unwrap_or_else(|| {
        let total = input.store.total_votes_or_sentinel();
        let text = match input.store.nearest_reset(input.now) {
            Some((site, remaining)) => format!(
                "Votes {} | {}: {}",
                total,
                input.catalog.label(site),
                format_countdown(remaining)
            ),
            None => format!("Votes {} | {}", total, AVAILABLE_TEXT),
        };
        HudLine::new(text, Argb::from_rgb(input.prefs.available_color()))
    });
    single_line(HudStyle::CompactSingleLine, input, metrics, line)
}

/// Panel colors and text treatment of a boxed style
#[derive(Debug, Clone, Copy)]
struct BoxedLook {
    background: Argb,
    border: Argb,
    shadow: bool,
    bleed: i32,
}

impl BoxedLook {
    const DARK: BoxedLook = BoxedLook {
        background: Argb(0x8800_0000),
        border: Argb(0xFFAA_AAAA),
        shadow: true,
        bleed: PANEL_BLEED,
    };

    const LIGHT: BoxedLook = BoxedLook {
        background: Argb(0xAAFF_FFFF),
        border: Argb(0xFF00_0000),
        shadow: false,
        bleed: 0,
    };
}

/// Header plus one line per site
fn site_lines(
    input: &LayoutInput<'_>,
    site_color: impl Fn(&SiteStatus<'_>) -> Argb,
) -> Vec<HudLine> {
    if let Some(line) = status_line(input.store) {
        return vec![line];
    }

    let mut lines = vec![HudLine::new(
        format!("Votes this month: {}", input.store.total_votes_or_sentinel()),
        Argb::from_rgb(input.prefs.available_color()),
    )];

    for status in input.store.site_statuses(input.now) {
        let time = if status.available {
            AVAILABLE_TEXT.to_string()
        } else {
            format_countdown(status.remaining)
        };

        let mut color = site_color(&status);
        if let Some(alpha) = input.tracker.pulse(status.site, input.now) {
            color = color.scale_alpha(alpha);
        }

        lines.push(HudLine::new(
            format!("{}: {}", input.catalog.label(status.site), time),
            color,
        ));
    }

    // Retained data after a failed fetch is stale
    if input.store.has_error() {
        lines.push(HudLine::new(ERROR_TEXT, ERROR_COLOR));
    }
    lines
}

fn boxed(
    style: HudStyle,
    input: &LayoutInput<'_>,
    metrics: &dyn TextMetrics,
    look: BoxedLook,
    site_color: impl Fn(&SiteStatus<'_>) -> Argb,
) -> RenderPlan {
    let lines = site_lines(input, site_color);

    let text_width = lines
        .iter()
        .map(|line| metrics.text_width(&line.text))
        .max()
        .unwrap_or(EMPTY_CONTENT_WIDTH);
    let width = text_width + 2 * HUD_PADDING;
    let height = lines.len() as i32 * LINE_HEIGHT + 2 * HUD_PADDING;

    // Anchor the panel including its bleed so the bleed stays on screen too
    let scale = input.prefs.hud_scale();
    let (px, py) = resolve_anchor(
        input.viewport,
        scale,
        width + look.bleed,
        height + look.bleed,
        HUD_PADDING,
        input.prefs.anchor(),
    );
    let origin = (px + look.bleed, py + look.bleed);

    RenderPlan {
        style,
        scale,
        origin,
        width,
        height,
        panel: Some(Panel {
            rect: Rect::new(px, py, width + look.bleed, height + look.bleed),
            background: look.background,
            border: look.border,
        }),
        lines,
        text_inset: HUD_PADDING,
        shadow: look.shadow,
    }
}
