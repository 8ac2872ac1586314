//! Debounced preference persistence

use std::sync::{Arc, Mutex};
use votehud_util::EpochMillis;

use crate::{
    ConfigError, ConfigResult, HudAnchor, HudStyle, PreferenceBackend, Preferences, SCALE_STEP,
    WriteStatus, from_document, to_document,
};

/// Quiet period after the last change before a write is committed
pub const DEBOUNCE_WINDOW_MS: i64 = 500;

/// Preference store shared between the frame loop and the fallback saver
pub type SharedPreferences = Arc<Mutex<PreferenceStore>>;

/// Result of one [`PreferenceStore::flush_if_due`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing to write
    Clean,
    /// Changes pending, but the debounce window is still open
    Deferred,
    /// Pending changes were handed to the backend, which has not confirmed them yet
    InFlight,
    /// Pending changes were written
    Written,
    /// The write failed; the changes stay pending
    Failed,
}

/// Holds the live preferences and decides when to persist them.
///
/// Every mutation marks the store dirty and stamps the change time. The
/// frame loop calls [`flush_if_due`](Self::flush_if_due) each tick; a write
/// happens only once the store has been quiet for the debounce window, so a
/// burst of key repeats collapses into a single write. The store stays
/// dirty until the backend confirms the write of its latest revision.
pub struct PreferenceStore {
    prefs: Preferences,
    dirty: bool,
    last_change: EpochMillis,
    /// Bumped by every mutation
    revision: u64,
    /// Revision handed to the backend and not yet confirmed
    in_flight: Option<u64>,
    backend: Box<dyn PreferenceBackend>,
}

impl PreferenceStore {
    /// Load preferences from `backend`, falling back to defaults on any failure
    pub fn load(backend: impl PreferenceBackend + 'static) -> Self {
        let prefs = match backend.load() {
            Ok(Some(document)) => match from_document(&document) {
                Ok(prefs) => prefs,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring stored preferences, using defaults");
                    Preferences::default()
                }
            },
            Ok(None) => {
                tracing::debug!("No stored preferences, using defaults");
                Preferences::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load preferences, using defaults");
                Preferences::default()
            }
        };

        Self::with_preferences(prefs, backend)
    }

    /// Store holding `prefs`, not yet dirty
    pub fn with_preferences(prefs: Preferences, backend: impl PreferenceBackend + 'static) -> Self {
        Self {
            prefs,
            dirty: false,
            last_change: 0,
            revision: 0,
            in_flight: None,
            backend: Box::new(backend),
        }
    }

    pub fn into_shared(self) -> SharedPreferences {
        Arc::new(Mutex::new(self))
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_change(&self) -> EpochMillis {
        self.last_change
    }

    fn mutate(&mut self, now: EpochMillis, apply: impl FnOnce(&mut Preferences)) {
        apply(&mut self.prefs);
        self.dirty = true;
        self.last_change = now;
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn set_hud_scale(&mut self, scale: f32, now: EpochMillis) {
        self.mutate(now, |p| p.set_hud_scale(scale));
    }

    /// Step the scale by `steps` increments of [`SCALE_STEP`]
    pub fn adjust_scale(&mut self, steps: i32, now: EpochMillis) {
        let target = self.prefs.hud_scale() + steps as f32 * SCALE_STEP;
        // Snap to the 0.1 grid
        let rounded = (target * 10.0).round() / 10.0;
        self.set_hud_scale(rounded, now);
    }

    pub fn set_style(&mut self, style: HudStyle, now: EpochMillis) {
        self.mutate(now, |p| p.set_style(style));
    }

    pub fn cycle_style(&mut self, now: EpochMillis) -> HudStyle {
        let next = self.prefs.style().next();
        self.set_style(next, now);
        next
    }

    pub fn set_anchor(&mut self, anchor: HudAnchor, now: EpochMillis) {
        self.mutate(now, |p| p.set_anchor(anchor));
    }

    pub fn cycle_anchor(&mut self, now: EpochMillis) -> HudAnchor {
        let next = self.prefs.anchor().next();
        self.set_anchor(next, now);
        next
    }

    pub fn set_available_color(&mut self, rgb: u32, now: EpochMillis) {
        self.mutate(now, |p| p.set_available_color(rgb));
    }

    pub fn set_unavailable_color(&mut self, rgb: u32, now: EpochMillis) {
        self.mutate(now, |p| p.set_unavailable_color(rgb));
    }

    pub fn set_auto_message(&mut self, message: &str, now: EpochMillis) {
        self.mutate(now, |p| p.set_auto_message(message));
    }

    pub fn set_timer_active(&mut self, active: bool, now: EpochMillis) {
        self.mutate(now, |p| p.set_timer_active(active));
    }

    pub fn set_timer_start(&mut self, start: EpochMillis, now: EpochMillis) {
        self.mutate(now, |p| p.set_timer_start(start));
    }

    pub fn set_timer_duration_minutes(&mut self, minutes: u32, now: EpochMillis) {
        self.mutate(now, |p| p.set_timer_duration_minutes(minutes));
    }

    /// Arm the compass timer starting at `now`
    pub fn restart_timer(&mut self, now: EpochMillis) {
        self.mutate(now, |p| {
            p.set_timer_active(true);
            p.set_timer_start(now);
        });
    }

    /// Write pending changes once the store has been quiet for the debounce window
    pub fn flush_if_due(&mut self, now: EpochMillis) -> FlushOutcome {
        if let Some(outcome) = self.settle_in_flight(now) {
            return outcome;
        }
        if !self.dirty {
            return FlushOutcome::Clean;
        }
        if now.saturating_sub(self.last_change) < DEBOUNCE_WINDOW_MS {
            return FlushOutcome::Deferred;
        }

        match self.backend.persist(&to_document(&self.prefs)) {
            Ok(()) => {
                self.in_flight = Some(self.revision);
                self.settle_in_flight(now).unwrap_or(FlushOutcome::InFlight)
            }
            Err(e) => self.write_failed(now, &e),
        }
    }

    /// Check on a write handed to the backend earlier.
    ///
    /// Returns `None` when nothing is in flight, or when the confirmed write
    /// has since been superseded by newer changes.
    fn settle_in_flight(&mut self, now: EpochMillis) -> Option<FlushOutcome> {
        let revision = self.in_flight?;
        match self.backend.write_status() {
            WriteStatus::Pending => Some(FlushOutcome::InFlight),
            WriteStatus::Done => {
                self.in_flight = None;
                if revision != self.revision {
                    return None;
                }
                self.dirty = false;
                self.log_flushed();
                Some(FlushOutcome::Written)
            }
            WriteStatus::Failed(e) => {
                self.in_flight = None;
                Some(self.write_failed(now, &e))
            }
        }
    }

    fn write_failed(&mut self, now: EpochMillis, error: &ConfigError) -> FlushOutcome {
        tracing::error!(error = %error, "Failed to save preferences, will retry");
        // Retry after another full window
        self.last_change = now;
        FlushOutcome::Failed
    }

    /// Write the current preferences regardless of the debounce state,
    /// waiting for the backend to confirm the write
    pub fn save_now(&mut self) -> ConfigResult<()> {
        let result = self
            .backend
            .persist(&to_document(&self.prefs))
            .and_then(|()| self.backend.sync());
        self.in_flight = None;
        result?;

        self.dirty = false;
        self.log_flushed();
        Ok(())
    }

    fn log_flushed(&self) {
        tracing::debug!(
            scale = self.prefs.hud_scale(),
            style = self.prefs.style().name(),
            "Preferences flushed"
        );
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("prefs", &self.prefs)
            .field("dirty", &self.dirty)
            .field("last_change", &self.last_change)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
