//! Preference model

use votehud_util::{EpochMillis, MILLIS_PER_MINUTE};

/// Smallest overlay scale
pub const SCALE_MIN: f32 = 0.5;

/// Largest overlay scale
pub const SCALE_MAX: f32 = 2.0;

/// Scale change per key press
pub const SCALE_STEP: f32 = 0.1;

/// Longest auto-message, in characters
pub const AUTO_MESSAGE_MAX_CHARS: usize = 256;

/// Compass timer duration bounds, in minutes
pub const TIMER_DURATION_MIN: u32 = 1;
pub const TIMER_DURATION_MAX: u32 = 24 * 60;

/// Overlay visual style.
///
/// The order is part of the persisted format: `styleIndex` stores the
/// position in [`HudStyle::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HudStyle {
    /// Single line: total and nearest countdown
    #[default]
    CompactMinimal,
    /// Boxed list, colors fade from red to green as resets approach
    GradientByTime,
    /// Boxed list, colors cycle through the hue wheel
    RainbowCycle,
    /// Single line: total, nearest site and countdown
    CompactSingleLine,
    /// Light boxed list for bright backgrounds
    ReadableBoxed,
    /// Dark boxed list with availability colors
    DefaultBoxed,
}

impl HudStyle {
    pub const ALL: [HudStyle; 6] = [
        HudStyle::CompactMinimal,
        HudStyle::GradientByTime,
        HudStyle::RainbowCycle,
        HudStyle::CompactSingleLine,
        HudStyle::ReadableBoxed,
        HudStyle::DefaultBoxed,
    ];

    /// Style at `index`, wrapping around the list
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(Self::ALL.len() as i64) as usize]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() as i64 + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            HudStyle::CompactMinimal => "compact-minimal",
            HudStyle::GradientByTime => "gradient-by-time",
            HudStyle::RainbowCycle => "rainbow-cycle",
            HudStyle::CompactSingleLine => "compact-single-line",
            HudStyle::ReadableBoxed => "readable-boxed",
            HudStyle::DefaultBoxed => "default-boxed",
        }
    }
}

/// Screen corner the overlay is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HudAnchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl HudAnchor {
    pub const ALL: [HudAnchor; 4] = [
        HudAnchor::TopLeft,
        HudAnchor::TopRight,
        HudAnchor::BottomLeft,
        HudAnchor::BottomRight,
    ];

    /// Anchor for a persisted index, `None` outside 0..=3
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn is_right(self) -> bool {
        matches!(self, HudAnchor::TopRight | HudAnchor::BottomRight)
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, HudAnchor::BottomLeft | HudAnchor::BottomRight)
    }
}

/// User-tunable display and behavior settings.
///
/// Every setter validates its argument, so a `Preferences` value is always
/// within bounds regardless of where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    hud_scale: f32,
    style: HudStyle,
    anchor: HudAnchor,
    available_color: u32,
    unavailable_color: u32,
    auto_message: String,
    timer_active: bool,
    timer_start: EpochMillis,
    timer_duration_minutes: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            hud_scale: 0.6,
            style: HudStyle::default(),
            anchor: HudAnchor::default(),
            available_color: 0x00FF88,
            unavailable_color: 0xFFFFFF,
            auto_message: String::new(),
            timer_active: false,
            timer_start: 0,
            timer_duration_minutes: 20,
        }
    }
}

impl Preferences {
    pub fn hud_scale(&self) -> f32 {
        self.hud_scale
    }

    pub fn style(&self) -> HudStyle {
        self.style
    }

    pub fn anchor(&self) -> HudAnchor {
        self.anchor
    }

    /// Packed `0xRRGGBB` color for available sites
    pub fn available_color(&self) -> u32 {
        self.available_color
    }

    /// Packed `0xRRGGBB` color for sites still cooling down
    pub fn unavailable_color(&self) -> u32 {
        self.unavailable_color
    }

    pub fn auto_message(&self) -> &str {
        &self.auto_message
    }

    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    pub fn timer_start(&self) -> EpochMillis {
        self.timer_start
    }

    pub fn timer_duration_minutes(&self) -> u32 {
        self.timer_duration_minutes
    }

    /// Compass cooldown length in milliseconds
    pub fn timer_duration_millis(&self) -> i64 {
        self.timer_duration_minutes as i64 * MILLIS_PER_MINUTE
    }

    /// Whether the compass timer has run out (or was never armed) at `now`
    pub fn timer_ready(&self, now: EpochMillis) -> bool {
        !self.timer_active
            || now.saturating_sub(self.timer_start) >= self.timer_duration_millis()
    }

    /// Milliseconds left on the compass timer at `now`
    pub fn timer_remaining(&self, now: EpochMillis) -> i64 {
        if self.timer_ready(now) {
            0
        } else {
            self.timer_duration_millis()
                .saturating_sub(now.saturating_sub(self.timer_start))
        }
    }

    pub fn set_hud_scale(&mut self, scale: f32) {
        self.hud_scale = if scale.is_finite() {
            scale.clamp(SCALE_MIN, SCALE_MAX)
        } else {
            Self::default().hud_scale
        };
    }

    pub fn set_style(&mut self, style: HudStyle) {
        self.style = style;
    }

    pub fn set_anchor(&mut self, anchor: HudAnchor) {
        self.anchor = anchor;
    }

    pub fn set_available_color(&mut self, rgb: u32) {
        self.available_color = rgb & 0xFF_FFFF;
    }

    pub fn set_unavailable_color(&mut self, rgb: u32) {
        self.unavailable_color = rgb & 0xFF_FFFF;
    }

    /// Set the auto-message, truncated to [`AUTO_MESSAGE_MAX_CHARS`]
    pub fn set_auto_message(&mut self, message: &str) {
        self.auto_message = message.chars().take(AUTO_MESSAGE_MAX_CHARS).collect();
    }

    pub fn set_timer_active(&mut self, active: bool) {
        self.timer_active = active;
    }

    pub fn set_timer_start(&mut self, start: EpochMillis) {
        self.timer_start = start.max(0);
    }

    pub fn set_timer_duration_minutes(&mut self, minutes: u32) {
        self.timer_duration_minutes = minutes.clamp(TIMER_DURATION_MIN, TIMER_DURATION_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.hud_scale(), 0.6);
        assert_eq!(prefs.style(), HudStyle::CompactMinimal);
        assert_eq!(prefs.anchor(), HudAnchor::TopLeft);
        assert_eq!(prefs.available_color(), 0x00FF88);
        assert_eq!(prefs.unavailable_color(), 0xFFFFFF);
        assert_eq!(prefs.timer_duration_minutes(), 20);
        assert!(prefs.timer_ready(0));
    }

    #[test]
    fn scale_is_clamped() {
        let mut prefs = Preferences::default();
        prefs.set_hud_scale(5.0);
        assert_eq!(prefs.hud_scale(), SCALE_MAX);
        prefs.set_hud_scale(0.1);
        assert_eq!(prefs.hud_scale(), SCALE_MIN);
        prefs.set_hud_scale(f32::NAN);
        assert_eq!(prefs.hud_scale(), 0.6);
    }

    #[test]
    fn style_cycle_wraps() {
        assert_eq!(HudStyle::DefaultBoxed.next(), HudStyle::CompactMinimal);
        assert_eq!(HudStyle::from_index(7), HudStyle::GradientByTime);
        assert_eq!(HudStyle::from_index(-1), HudStyle::DefaultBoxed);
        for (i, style) in HudStyle::ALL.iter().enumerate() {
            assert_eq!(style.index(), i);
        }
    }

    #[test]
    fn anchor_cycle_wraps() {
        assert_eq!(HudAnchor::BottomRight.next(), HudAnchor::TopLeft);
        assert_eq!(HudAnchor::from_index(3), Some(HudAnchor::BottomRight));
        assert_eq!(HudAnchor::from_index(4), None);
        assert_eq!(HudAnchor::from_index(-1), None);
        assert!(HudAnchor::BottomRight.is_right());
        assert!(HudAnchor::BottomLeft.is_bottom());
        assert!(!HudAnchor::TopRight.is_bottom());
    }

    #[test]
    fn auto_message_is_bounded() {
        let mut prefs = Preferences::default();
        prefs.set_auto_message(&"é".repeat(300));
        assert_eq!(prefs.auto_message().chars().count(), AUTO_MESSAGE_MAX_CHARS);
    }

    #[test]
    fn colors_are_masked_to_rgb() {
        let mut prefs = Preferences::default();
        prefs.set_available_color(0xFF12_3456);
        assert_eq!(prefs.available_color(), 0x12_3456);
    }

    #[test]
    fn timer_duration_is_clamped() {
        let mut prefs = Preferences::default();
        prefs.set_timer_duration_minutes(0);
        assert_eq!(prefs.timer_duration_minutes(), TIMER_DURATION_MIN);
        prefs.set_timer_duration_minutes(100_000);
        assert_eq!(prefs.timer_duration_minutes(), TIMER_DURATION_MAX);
    }

    #[test]
    fn timer_readiness() {
        let mut prefs = Preferences::default();
        prefs.set_timer_duration_minutes(20);
        prefs.set_timer_active(true);
        prefs.set_timer_start(1_000_000);

        assert!(!prefs.timer_ready(1_000_000));
        assert_eq!(prefs.timer_remaining(1_000_000), 20 * 60_000);
        assert_eq!(prefs.timer_remaining(1_000_000 + 60_000), 19 * 60_000);
        assert!(prefs.timer_ready(1_000_000 + 20 * 60_000));
        assert_eq!(prefs.timer_remaining(1_000_000 + 20 * 60_000), 0);
    }
}
