//! Per-site availability transitions

use std::collections::HashMap;
use tracing::info;
use votehud_api::{CooldownStore, SiteCatalog, SiteId};
use votehud_util::EpochMillis;

use crate::pulse_alpha;

/// How long a site pulses after becoming available
pub const ANIMATION_DURATION_MS: i64 = 3_000;

/// A site became available to vote on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub site: SiteId,
    pub label: String,
    pub at: EpochMillis,
}

/// Detects unavailable -> available edges and runs the alert animation.
///
/// Each edge fires exactly once: a site that stays available across many
/// ticks, or is fed the same snapshot repeatedly, does not alert again.
#[derive(Debug, Default)]
pub struct AvailabilityTracker {
    last_known: HashMap<SiteId, bool>,
    animations: HashMap<SiteId, EpochMillis>,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one snapshot into the tracker, returning the alerts it triggers
    pub fn update(
        &mut self,
        store: &CooldownStore,
        now: EpochMillis,
        catalog: &SiteCatalog,
    ) -> Vec<AlertEvent> {
        self.animations
            .retain(|_, start| now - *start < ANIMATION_DURATION_MS);

        // Absent data never alerts; known states are kept for when data returns
        if store.is_absent() {
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for status in store.site_statuses(now) {
            let was_available = self.last_known.get(status.site).copied().unwrap_or(false);

            if status.available && !was_available {
                let label = catalog.label(status.site);
                info!(site = %status.site, label = %label, "Vote available");

                self.animations.insert(status.site.clone(), now);
                alerts.push(AlertEvent {
                    site: status.site.clone(),
                    label,
                    at: now,
                });
            }

            self.last_known.insert(status.site.clone(), status.available);
        }

        alerts
    }

    /// Last availability observed for `site`
    pub fn last_known(&self, site: &SiteId) -> bool {
        self.last_known.get(site).copied().unwrap_or(false)
    }

    /// Whether `site` is mid-animation at `now`
    pub fn is_animating(&self, site: &SiteId, now: EpochMillis) -> bool {
        self.animations
            .get(site)
            .is_some_and(|start| now - *start < ANIMATION_DURATION_MS)
    }

    /// Pulse alpha factor for `site` at `now`, `None` when not animating
    pub fn pulse(&self, site: &SiteId, now: EpochMillis) -> Option<f32> {
        let start = self.animations.get(site)?;
        let elapsed = now - start;
        (0..ANIMATION_DURATION_MS)
            .contains(&elapsed)
            .then(|| pulse_alpha(elapsed))
    }

    pub fn active_animations(&self) -> usize {
        self.animations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use votehud_api::VoteResponse;

    const NOW: EpochMillis = 1_700_000_000_000;

    fn snapshot(sites: &[(&str, EpochMillis)]) -> CooldownStore {
        let sites: BTreeMap<SiteId, EpochMillis> =
            sites.iter().map(|(id, at)| (SiteId::new(*id), *at)).collect();
        CooldownStore::fresh(12, sites, NOW)
    }

    #[test]
    fn scenario_a_alerts_only_the_available_site() {
        let body = format!(r#"{{"votes":12,"sites":{{"2":{},"4":{}}}}}"#, NOW + 5_000, NOW - 1_000);
        let store = VoteResponse::parse(body.as_bytes()).unwrap().into_store(NOW);
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();

        assert_eq!(store.remaining(&SiteId::new("2"), NOW), Some(5_000));
        let alerts = tracker.update(&store, NOW, &catalog);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].site.as_str(), "4");
        assert_eq!(alerts[0].label, "Serveurs Minecraft");
        assert!(tracker.last_known(&SiteId::new("4")));
        assert!(!tracker.last_known(&SiteId::new("2")));
    }

    #[test]
    fn same_snapshot_twice_is_idempotent() {
        let store = snapshot(&[("4", NOW - 1_000)]);
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();

        assert_eq!(tracker.update(&store, NOW, &catalog).len(), 1);
        for tick in 1..100 {
            assert!(tracker.update(&store, NOW + tick * 50, &catalog).is_empty());
        }
    }

    #[test]
    fn transition_over_time_fires_once() {
        let store = snapshot(&[("2", NOW + 5_000)]);
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();

        let mut fired = 0;
        let mut t = NOW;
        while t < NOW + 10_000 {
            fired += tracker.update(&store, t, &catalog).len();
            t += 50;
        }
        assert_eq!(fired, 1);
        assert!(tracker.last_known(&SiteId::new("2")));
    }

    #[test]
    fn new_cooldown_rearms_the_alert() {
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();

        assert_eq!(tracker.update(&snapshot(&[("2", NOW - 1)]), NOW, &catalog).len(), 1);
        // Voted: the site goes back on cooldown, then resets again
        assert!(tracker.update(&snapshot(&[("2", NOW + 1_000)]), NOW, &catalog).is_empty());
        assert_eq!(
            tracker.update(&snapshot(&[("2", NOW + 1_000)]), NOW + 1_000, &catalog).len(),
            1
        );
    }

    #[test]
    fn absent_data_never_alerts() {
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();

        assert!(tracker.update(&CooldownStore::uninitialized(), NOW, &catalog).is_empty());
        assert!(tracker.update(&CooldownStore::failed(NOW, "timeout"), NOW, &catalog).is_empty());
    }

    #[test]
    fn absence_keeps_known_state() {
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();
        let store = snapshot(&[("4", NOW - 1_000)]);

        assert_eq!(tracker.update(&store, NOW, &catalog).len(), 1);
        tracker.update(&CooldownStore::failed(NOW + 10, "timeout"), NOW + 10, &catalog);
        assert!(tracker.update(&store, NOW + 20, &catalog).is_empty());
    }

    #[test]
    fn animation_expires_after_duration() {
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();
        let store = snapshot(&[("4", NOW - 1_000)]);
        let site = SiteId::new("4");

        tracker.update(&store, NOW, &catalog);
        assert!(tracker.is_animating(&site, NOW + 1_000));
        assert!(tracker.pulse(&site, NOW + 75).is_some_and(|a| a > 0.99));

        assert!(tracker.pulse(&site, NOW + ANIMATION_DURATION_MS).is_none());
        tracker.update(&store, NOW + ANIMATION_DURATION_MS, &catalog);
        assert_eq!(tracker.active_animations(), 0);
    }

    #[test]
    fn extreme_server_timestamps_do_not_overflow() {
        let body = br#"{"votes":1,"sites":{"2":-9223372036854775808,"4":9223372036854775807}}"#;
        let store = VoteResponse::parse(body).unwrap().into_store(NOW);
        let catalog = SiteCatalog::default();
        let mut tracker = AvailabilityTracker::new();

        let alerts = tracker.update(&store, NOW, &catalog);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].site.as_str(), "2");
        assert!(!tracker.last_known(&SiteId::new("4")));
    }
}
