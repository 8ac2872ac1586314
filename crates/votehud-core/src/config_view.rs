//! Text-driven configuration view
//!
//! Hosts without a graphical settings screen can offer the same edits as
//! typed commands, e.g. `scale 1.2`, `style`, `message /vote`, `done`.

use std::str::FromStr;
use thiserror::Error;
use votehud_config::{
    ConfigError, HudAnchor, HudStyle, PreferenceStore, Preferences, SCALE_MAX, SCALE_MIN,
};
use votehud_util::EpochMillis;

/// Name hosts use for the configuration view
pub const CONFIG_VIEW_NAME: &str = "votehud";

/// Errors from the configuration view
#[derive(Debug, Error)]
pub enum ConfigViewError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Failed to save preferences: {0}")]
    Save(#[from] ConfigError),
}

/// One edit in the configuration view
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    Scale(f32),
    CycleStyle,
    Style(HudStyle),
    CycleAnchor,
    Anchor(HudAnchor),
    AvailableColor(u32),
    UnavailableColor(u32),
    Message(String),
    TimerDuration(u32),
    TimerOff,
    Show,
    /// Save immediately and close the view
    Done,
}

fn invalid(field: &'static str, value: &str) -> ConfigViewError {
    ConfigViewError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<u32, ConfigViewError> {
    let hex = value.trim_start_matches('#').trim_start_matches("0x");
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|rgb| *rgb <= 0xFF_FFFF)
        .ok_or_else(|| invalid(field, value))
}

impl FromStr for ConfigCommand {
    type Err = ConfigViewError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        match (command.to_ascii_lowercase().as_str(), rest) {
            ("scale", value) => value
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite())
                .map(ConfigCommand::Scale)
                .ok_or_else(|| invalid("scale", value)),
            ("style", "") => Ok(ConfigCommand::CycleStyle),
            ("style", value) => HudStyle::ALL
                .into_iter()
                .find(|s| s.name() == value)
                .or_else(|| value.parse::<i64>().ok().map(HudStyle::from_index))
                .map(ConfigCommand::Style)
                .ok_or_else(|| invalid("style", value)),
            ("anchor", "") => Ok(ConfigCommand::CycleAnchor),
            ("anchor", value) => value
                .parse::<i64>()
                .ok()
                .and_then(HudAnchor::from_index)
                .map(ConfigCommand::Anchor)
                .ok_or_else(|| invalid("anchor", value)),
            ("available", value) => {
                parse_color("available", value).map(ConfigCommand::AvailableColor)
            }
            ("unavailable", value) => {
                parse_color("unavailable", value).map(ConfigCommand::UnavailableColor)
            }
            ("message", value) => Ok(ConfigCommand::Message(value.to_string())),
            ("timer", "off") => Ok(ConfigCommand::TimerOff),
            ("timer", value) => value
                .parse::<u32>()
                .ok()
                .map(ConfigCommand::TimerDuration)
                .ok_or_else(|| invalid("timer", value)),
            ("show", _) => Ok(ConfigCommand::Show),
            ("done", _) => Ok(ConfigCommand::Done),
            _ => Err(ConfigViewError::UnknownCommand(line.to_string())),
        }
    }
}

/// What applying a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// The view stays open; lines to show the user
    Updated(Vec<String>),
    /// Preferences were saved and the view closed
    Closed,
}

impl ConfigCommand {
    /// Apply the command to the store
    pub fn apply(
        self,
        store: &mut PreferenceStore,
        now: EpochMillis,
    ) -> Result<ConfigOutcome, ConfigViewError> {
        match self {
            ConfigCommand::Scale(scale) => store.set_hud_scale(scale, now),
            ConfigCommand::CycleStyle => {
                store.cycle_style(now);
            }
            ConfigCommand::Style(style) => store.set_style(style, now),
            ConfigCommand::CycleAnchor => {
                store.cycle_anchor(now);
            }
            ConfigCommand::Anchor(anchor) => store.set_anchor(anchor, now),
            ConfigCommand::AvailableColor(rgb) => store.set_available_color(rgb, now),
            ConfigCommand::UnavailableColor(rgb) => store.set_unavailable_color(rgb, now),
            ConfigCommand::Message(message) => store.set_auto_message(&message, now),
            ConfigCommand::TimerDuration(minutes) => {
                store.set_timer_duration_minutes(minutes, now)
            }
            ConfigCommand::TimerOff => store.set_timer_active(false, now),
            ConfigCommand::Show => {}
            ConfigCommand::Done => {
                store.save_now()?;
                return Ok(ConfigOutcome::Closed);
            }
        }
        Ok(ConfigOutcome::Updated(describe(store.preferences())))
    }
}

/// Human-readable summary of the current preferences
pub fn describe(prefs: &Preferences) -> Vec<String> {
    vec![
        format!(
            "HUD scale: {:.2} ({:.1}-{:.1})",
            prefs.hud_scale(),
            SCALE_MIN,
            SCALE_MAX
        ),
        format!("Style: {}", prefs.style().name()),
        format!("Position: {}", prefs.anchor().index()),
        format!(
            "Colors: available #{:06X}, unavailable #{:06X}",
            prefs.available_color(),
            prefs.unavailable_color()
        ),
        format!("Auto message: {:?}", prefs.auto_message()),
        format!(
            "Timer: {} min{}",
            prefs.timer_duration_minutes(),
            if prefs.timer_active() { ", armed" } else { "" }
        ),
    ]
}
