//! Cooldown snapshot published by each fetch

use std::collections::BTreeMap;
use votehud_util::EpochMillis;

use crate::SiteId;

/// Value reported for the vote total when no fetch has succeeded
pub const UNINITIALIZED_SENTINEL: i64 = -1;

/// Outcome of the most recent fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No fetch has completed yet
    #[default]
    Pending,

    /// The last fetch succeeded
    Fresh { fetched_at: EpochMillis },

    /// The last fetch failed
    Failed { at: EpochMillis, reason: String },
}

/// What a site's cooldown looks like at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteStatus<'a> {
    pub site: &'a SiteId,
    pub reset_at: EpochMillis,
    /// Milliseconds until the reset; zero or negative once available
    pub remaining: i64,
    pub available: bool,
}

/// Per-site vote cooldowns and the monthly vote total.
///
/// A store is immutable once built: every fetch produces a whole new one,
/// so a reader holding a store always sees one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CooldownStore {
    total_votes: Option<i64>,
    /// `None` means "absent": the last fetch failed or none succeeded yet.
    /// This is distinct from `Some(empty)`, a successful fetch with no sites.
    sites: Option<BTreeMap<SiteId, EpochMillis>>,
    status: FetchStatus,
}

impl CooldownStore {
    /// Store before any fetch has completed
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Store after a failed fetch with nothing retained
    pub fn failed(at: EpochMillis, reason: impl Into<String>) -> Self {
        Self {
            total_votes: None,
            sites: None,
            status: FetchStatus::Failed {
                at,
                reason: reason.into(),
            },
        }
    }

    /// Store built from a successful fetch
    pub fn fresh(
        total_votes: i64,
        sites: BTreeMap<SiteId, EpochMillis>,
        fetched_at: EpochMillis,
    ) -> Self {
        Self {
            total_votes: Some(total_votes),
            sites: Some(sites),
            status: FetchStatus::Fresh { fetched_at },
        }
    }

    /// Copy of this store flagged with a fetch error, keeping its data.
    pub fn with_error(&self, at: EpochMillis, reason: impl Into<String>) -> Self {
        Self {
            total_votes: self.total_votes,
            sites: self.sites.clone(),
            status: FetchStatus::Failed {
                at,
                reason: reason.into(),
            },
        }
    }

    pub fn total_votes(&self) -> Option<i64> {
        self.total_votes
    }

    /// Vote total, or [`UNINITIALIZED_SENTINEL`] when unknown
    pub fn total_votes_or_sentinel(&self) -> i64 {
        self.total_votes.unwrap_or(UNINITIALIZED_SENTINEL)
    }

    pub fn sites(&self) -> Option<&BTreeMap<SiteId, EpochMillis>> {
        self.sites.as_ref()
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Whether site data is absent (never fetched, or discarded after a failure)
    pub fn is_absent(&self) -> bool {
        self.sites.is_none()
    }

    /// Whether no fetch has completed yet
    pub fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Pending)
    }

    /// Whether the most recent fetch failed
    pub fn has_error(&self) -> bool {
        matches!(self.status, FetchStatus::Failed { .. })
    }

    /// Milliseconds until `site` resets, if the site is known
    pub fn remaining(&self, site: &SiteId, now: EpochMillis) -> Option<i64> {
        self.sites
            .as_ref()
            .and_then(|sites| sites.get(site))
            .map(|reset_at| reset_at.saturating_sub(now))
    }

    /// Whether `site` can be voted on at `now`, if the site is known
    pub fn is_available(&self, site: &SiteId, now: EpochMillis) -> Option<bool> {
        self.remaining(site, now).map(|remaining| remaining <= 0)
    }

    /// Per-site status at `now`, ordered by site id. Empty when absent.
    pub fn site_statuses(&self, now: EpochMillis) -> Vec<SiteStatus<'_>> {
        let Some(sites) = &self.sites else {
            return Vec::new();
        };

        sites
            .iter()
            .map(|(site, &reset_at)| {
                let remaining = reset_at.saturating_sub(now);
                SiteStatus {
                    site,
                    reset_at,
                    remaining,
                    available: remaining <= 0,
                }
            })
            .collect()
    }

    /// The still-cooling-down site that resets soonest, with its remaining time.
    ///
    /// Returns `None` when every site is available or no data is present.
    pub fn nearest_reset(&self, now: EpochMillis) -> Option<(&SiteId, i64)> {
        self.sites
            .as_ref()?
            .iter()
            .map(|(site, &reset_at)| (site, reset_at.saturating_sub(now)))
            .filter(|(_, remaining)| *remaining > 0)
            .min_by_key(|(_, remaining)| *remaining)
    }

    /// Number of sites available at `now`
    pub fn available_count(&self, now: EpochMillis) -> usize {
        self.site_statuses(now).iter().filter(|s| s.available).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: EpochMillis) -> CooldownStore {
        let mut sites = BTreeMap::new();
        sites.insert(SiteId::new("2"), now + 5_000);
        sites.insert(SiteId::new("4"), now - 1_000);
        sites.insert(SiteId::new("5"), now + 90_000);
        CooldownStore::fresh(12, sites, now)
    }

    #[test]
    fn uninitialized_is_loading_and_absent() {
        let store = CooldownStore::uninitialized();
        assert!(store.is_loading());
        assert!(store.is_absent());
        assert!(!store.has_error());
        assert_eq!(store.total_votes_or_sentinel(), UNINITIALIZED_SENTINEL);
    }

    #[test]
    fn failed_is_absent_with_sentinel() {
        let store = CooldownStore::failed(1_000, "timed out");
        assert!(store.is_absent());
        assert!(store.has_error());
        assert!(!store.is_loading());
        assert_eq!(store.total_votes_or_sentinel(), -1);
        assert!(store.site_statuses(1_000).is_empty());
    }

    #[test]
    fn empty_sites_is_not_absent() {
        let store = CooldownStore::fresh(3, BTreeMap::new(), 0);
        assert!(!store.is_absent());
        assert_eq!(store.sites().map(|s| s.len()), Some(0));
    }

    #[test]
    fn remaining_and_availability() {
        let now = 1_700_000_000_000;
        let store = sample(now);

        assert_eq!(store.remaining(&SiteId::new("2"), now), Some(5_000));
        assert_eq!(store.is_available(&SiteId::new("2"), now), Some(false));
        assert_eq!(store.is_available(&SiteId::new("4"), now), Some(true));
        assert_eq!(store.is_available(&SiteId::new("9"), now), None);

        // Exactly at the reset instant the site is available
        assert_eq!(store.is_available(&SiteId::new("2"), now + 5_000), Some(true));
    }

    #[test]
    fn nearest_reset_skips_available_sites() {
        let now = 1_700_000_000_000;
        let store = sample(now);

        let (site, remaining) = store.nearest_reset(now).unwrap();
        assert_eq!(site.as_str(), "2");
        assert_eq!(remaining, 5_000);

        // Once everything has reset there is nothing pending
        assert!(store.nearest_reset(now + 100_000).is_none());
    }

    #[test]
    fn site_statuses_are_ordered() {
        let now = 1_700_000_000_000;
        let store = sample(now);
        let ids: Vec<&str> = store.site_statuses(now).iter().map(|s| s.site.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "5"]);
        assert_eq!(store.available_count(now), 1);
    }

    #[test]
    fn extreme_reset_timestamps_saturate() {
        let now = 1_700_000_000_000;
        let mut sites = BTreeMap::new();
        sites.insert(SiteId::new("2"), i64::MIN);
        sites.insert(SiteId::new("4"), i64::MAX);
        let store = CooldownStore::fresh(1, sites, now);

        assert_eq!(store.remaining(&SiteId::new("2"), now), Some(i64::MIN));
        assert_eq!(store.is_available(&SiteId::new("2"), now), Some(true));
        assert_eq!(store.remaining(&SiteId::new("4"), -now), Some(i64::MAX));

        let statuses = store.site_statuses(now);
        assert!(statuses[0].available);
        assert!(!statuses[1].available);

        let (site, remaining) = store.nearest_reset(now).unwrap();
        assert_eq!(site.as_str(), "4");
        assert_eq!(remaining, i64::MAX - now);
    }

    #[test]
    fn with_error_keeps_data() {
        let now = 1_700_000_000_000;
        let store = sample(now).with_error(now + 10, "HTTP 503");
        assert!(store.has_error());
        assert!(!store.is_absent());
        assert_eq!(store.total_votes(), Some(12));
    }
}
