//! Color math for the overlay styles

use std::f64::consts::PI;
use votehud_api::SiteId;
use votehud_host_api::Argb;
use votehud_util::{EpochMillis, MILLIS_PER_HOUR};

/// Remaining time at which the gradient is fully red
pub const GRADIENT_WINDOW_MS: i64 = 2 * MILLIS_PER_HOUR;

/// Duration of one full trip around the hue wheel
pub const RAINBOW_CYCLE_MS: i64 = 10_000;

/// Half-period of the alert pulse
pub const PULSE_PERIOD_MS: f64 = 150.0;

/// Loading line color
pub const LOADING_COLOR: Argb = Argb::from_rgb(0xAAAAAA);

/// Fetch error line color
pub const ERROR_COLOR: Argb = Argb::from_rgb(0xFF5555);

/// Convert hue/saturation/brightness (each 0..=1, hue wrapping) to `0xRRGGBB`
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> u32 {
    let channel = |v: f32| (v * 255.0 + 0.5) as u32;

    if saturation == 0.0 {
        let v = channel(brightness);
        return v << 16 | v << 8 | v;
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };
    channel(r) << 16 | channel(g) << 8 | channel(b)
}

/// Red when `remaining` is two hours or more, green at zero, linear between
pub fn gradient_color(remaining: i64) -> Argb {
    let ratio = (remaining as f64 / GRADIENT_WINDOW_MS as f64).clamp(0.0, 1.0);
    let red = (255.0 * ratio) as u8;
    let green = (255.0 * (1.0 - ratio)) as u8;
    Argb::from_channels(red, green, 0)
}

/// Fully saturated hue cycling over time, offset per site
pub fn rainbow_color(site: &SiteId, now: EpochMillis) -> Argb {
    let cycle = now.rem_euclid(RAINBOW_CYCLE_MS) as f32 / RAINBOW_CYCLE_MS as f32;
    let offset = (site.stable_hash() % 360) as f32 / 360.0;
    let hue = (cycle + offset).fract();
    Argb::from_rgb(hsb_to_rgb(hue, 1.0, 1.0))
}

/// Alpha factor of the alert pulse `elapsed` ms into the animation
pub fn pulse_alpha(elapsed: i64) -> f32 {
    (elapsed as f64 / PULSE_PERIOD_MS * PI).sin().abs() as f32
}
