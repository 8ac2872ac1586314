//! Persisted preferences document
//!
//! The document is a flat JSON object. Loading is best-effort per key: a
//! missing key or a value of the wrong shape leaves that one field at its
//! default and the rest of the document still applies.

use serde_json::{Map, Value};

use crate::{ConfigError, ConfigResult, HudAnchor, HudStyle, Preferences};

pub const HUD_SCALE_KEY: &str = "hudScale";
pub const STYLE_INDEX_KEY: &str = "styleIndex";
pub const HUD_ANCHOR_KEY: &str = "hudAnchor";
pub const AVAILABLE_COLOR_KEY: &str = "availableColor";
pub const UNAVAILABLE_COLOR_KEY: &str = "unavailableColor";
pub const AUTO_MESSAGE_KEY: &str = "autoMessage";
pub const TIMER_ACTIVE_KEY: &str = "timerActive";
pub const TIMER_START_KEY: &str = "timerStart";
pub const TIMER_DURATION_KEY: &str = "timerDuration";

/// Serialize preferences into their persisted document
pub fn to_document(prefs: &Preferences) -> Value {
    let mut obj = Map::new();
    obj.insert(HUD_SCALE_KEY.into(), Value::from(prefs.hud_scale() as f64));
    obj.insert(STYLE_INDEX_KEY.into(), Value::from(prefs.style().index() as u64));
    obj.insert(HUD_ANCHOR_KEY.into(), Value::from(prefs.anchor().index() as u64));
    obj.insert(AVAILABLE_COLOR_KEY.into(), Value::from(prefs.available_color()));
    obj.insert(UNAVAILABLE_COLOR_KEY.into(), Value::from(prefs.unavailable_color()));
    obj.insert(AUTO_MESSAGE_KEY.into(), Value::from(prefs.auto_message()));
    obj.insert(TIMER_ACTIVE_KEY.into(), Value::from(prefs.timer_active()));
    obj.insert(TIMER_START_KEY.into(), Value::from(prefs.timer_start()));
    obj.insert(
        TIMER_DURATION_KEY.into(),
        Value::from(prefs.timer_duration_minutes()),
    );
    Value::Object(obj)
}

/// Overlay a persisted document onto the defaults.
///
/// Fails only when the document is not an object at all.
pub fn from_document(document: &Value) -> ConfigResult<Preferences> {
    let obj = document.as_object().ok_or(ConfigError::NotAnObject)?;
    let mut prefs = Preferences::default();

    if let Some(scale) = read(obj, HUD_SCALE_KEY, Value::as_f64) {
        prefs.set_hud_scale(scale as f32);
    }
    if let Some(index) = read(obj, STYLE_INDEX_KEY, Value::as_i64) {
        prefs.set_style(HudStyle::from_index(index));
    }
    if let Some(anchor) = read(obj, HUD_ANCHOR_KEY, Value::as_i64).and_then(HudAnchor::from_index)
    {
        prefs.set_anchor(anchor);
    }
    if let Some(rgb) = read(obj, AVAILABLE_COLOR_KEY, as_color) {
        prefs.set_available_color(rgb);
    }
    if let Some(rgb) = read(obj, UNAVAILABLE_COLOR_KEY, as_color) {
        prefs.set_unavailable_color(rgb);
    }
    if let Some(message) = read(obj, AUTO_MESSAGE_KEY, Value::as_str) {
        prefs.set_auto_message(message);
    }
    if let Some(active) = read(obj, TIMER_ACTIVE_KEY, Value::as_bool) {
        prefs.set_timer_active(active);
    }
    if let Some(start) = read(obj, TIMER_START_KEY, Value::as_i64) {
        prefs.set_timer_start(start);
    }
    if let Some(minutes) = read(obj, TIMER_DURATION_KEY, Value::as_u64) {
        prefs.set_timer_duration_minutes(u32::try_from(minutes).unwrap_or(u32::MAX));
    }

    Ok(prefs)
}

fn read<'a, T>(
    obj: &'a Map<String, Value>,
    key: &str,
    extract: impl FnOnce(&'a Value) -> Option<T>,
) -> Option<T> {
    let value = obj.get(key)?;
    let extracted = extract(value);
    if extracted.is_none() {
        tracing::debug!(key, value = %value, "Ignoring malformed preference value");
    }
    extracted
}

fn as_color(value: &Value) -> Option<u32> {
    value
        .as_i64()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v <= 0xFF_FFFF)
}
