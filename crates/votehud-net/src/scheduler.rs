//! Join/leave driven polling
//!
//! While connected to the vote service the scheduler fetches immediately,
//! then once per period. Each fetch runs as its own detached task, so
//! cancelling the schedule never interrupts a request already in flight:
//! such a request may still complete and publish its result.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use votehud_api::{FailurePolicy, ServiceMatcher, SharedCooldowns};
use votehud_util::now_millis;

use crate::CooldownSource;

/// Default time between fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Connection lifecycle reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Joined { address: String, username: String },
    Left,
}

struct ActivePoll {
    username: String,
    task: JoinHandle<()>,
}

/// Owns the single periodic fetch task.
///
/// Must be driven from within a tokio runtime.
pub struct PollScheduler {
    source: Arc<dyn CooldownSource>,
    shared: SharedCooldowns,
    matcher: ServiceMatcher,
    period: Duration,
    policy: FailurePolicy,
    active: Option<ActivePoll>,
}

impl PollScheduler {
    pub fn new(
        source: Arc<dyn CooldownSource>,
        shared: SharedCooldowns,
        matcher: ServiceMatcher,
    ) -> Self {
        Self {
            source,
            shared,
            matcher,
            period: DEFAULT_POLL_INTERVAL,
            policy: FailurePolicy::default(),
            active: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn shared(&self) -> &SharedCooldowns {
        &self.shared
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Username being polled, if any
    pub fn username(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.username.as_str())
    }

    /// React to a connection change
    pub fn handle(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Joined { address, username } => {
                if self.matcher.is_match(&address) {
                    info!(address = %address, username = %username, "Joined vote service");
                    self.join(&username);
                } else {
                    debug!(address = %address, "Joined unrelated server");
                    self.leave();
                }
            }
            ConnectionEvent::Left => self.leave(),
        }
    }

    /// Start polling for `username`, replacing any previous schedule
    pub fn join(&mut self, username: &str) {
        let username = username.trim();
        if username.is_empty() {
            warn!("Refusing to poll without a username");
            return;
        }

        self.cancel();

        let source = Arc::clone(&self.source);
        let shared = self.shared.clone();
        let policy = self.policy;
        let period = self.period;
        let name = username.to_string();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // The first tick completes immediately
            loop {
                interval.tick().await;
                spawn_fetch(Arc::clone(&source), name.clone(), shared.clone(), policy);
            }
        });

        info!(username = %username, period_secs = period.as_secs(), "Vote polling started");
        self.active = Some(ActivePoll {
            username: username.to_string(),
            task,
        });
    }

    /// Stop polling; the current snapshot is left as is
    pub fn leave(&mut self) {
        if self.cancel() {
            info!("Vote polling stopped");
        }
    }

    /// Fetch once right away, outside the periodic schedule
    pub fn fetch_now(&self) -> bool {
        let Some(active) = &self.active else {
            return false;
        };
        spawn_fetch(
            Arc::clone(&self.source),
            active.username.clone(),
            self.shared.clone(),
            self.policy,
        );
        true
    }

    /// Cancel everything for process exit
    pub fn shutdown(&mut self) {
        if self.cancel() {
            info!("Vote polling shut down");
        }
    }

    fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.task.abort();
                debug!(username = %active.username, "Cancelled periodic fetch task");
                true
            }
            None => false,
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn spawn_fetch(
    source: Arc<dyn CooldownSource>,
    username: String,
    shared: SharedCooldowns,
    policy: FailurePolicy,
) {
    tokio::spawn(async move {
        fetch_once(source.as_ref(), &username, &shared, policy).await;
    });
}

/// Run one fetch and publish its outcome, returning whether it succeeded
pub async fn fetch_once(
    source: &dyn CooldownSource,
    username: &str,
    shared: &SharedCooldowns,
    policy: FailurePolicy,
) -> bool {
    match source.fetch(username).await {
        Ok(response) => {
            debug!(
                username = %username,
                votes = response.votes,
                sites = response.sites.len(),
                "Vote status fetched"
            );
            shared.publish(response.into_store(now_millis()));
            true
        }
        Err(e) => {
            warn!(username = %username, error = %e, "Failed to fetch vote status");
            shared.publish_failure(policy, now_millis(), &e.to_string());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockReply, MockSource};
    use std::collections::BTreeMap;
    use tokio::time::{sleep, timeout};
    use votehud_api::VoteResponse;

    fn response(votes: i64) -> VoteResponse {
        let mut sites = BTreeMap::new();
        sites.insert("2".to_string(), now_millis() + 60_000);
        VoteResponse { votes, sites }
    }

    fn scheduler(source: &MockSource, period: Duration) -> PollScheduler {
        PollScheduler::new(
            Arc::new(source.clone()),
            SharedCooldowns::new(),
            ServiceMatcher::default(),
        )
        .with_period(period)
    }

    async fn wait_for_requests(source: &MockSource, count: usize) {
        timeout(Duration::from_secs(5), async {
            while source.request_count() < count {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn fetch_once_publishes_success() {
        let source = MockSource::always(MockReply::Ok(response(12)));
        let shared = SharedCooldowns::new();

        assert!(fetch_once(&source, "Steve", &shared, FailurePolicy::Discard).await);
        assert_eq!(shared.current().total_votes(), Some(12));
    }

    #[tokio::test]
    async fn scenario_b_timeout_resets_snapshot() {
        let source = MockSource::new();
        source.push(MockReply::Ok(response(12)));
        source.push(MockReply::Timeout);
        let shared = SharedCooldowns::new();

        fetch_once(&source, "Steve", &shared, FailurePolicy::Discard).await;
        assert!(!fetch_once(&source, "Steve", &shared, FailurePolicy::Discard).await);

        let store = shared.current();
        assert_eq!(store.total_votes_or_sentinel(), -1);
        assert!(store.sites().is_none());
        assert!(store.has_error());
    }

    #[tokio::test]
    async fn retain_policy_keeps_data_on_failure() {
        let source = MockSource::new();
        source.push(MockReply::Ok(response(12)));
        source.push(MockReply::Status(503));
        let shared = SharedCooldowns::new();

        fetch_once(&source, "Steve", &shared, FailurePolicy::RetainLastGood).await;
        fetch_once(&source, "Steve", &shared, FailurePolicy::RetainLastGood).await;

        let store = shared.current();
        assert_eq!(store.total_votes(), Some(12));
        assert!(store.has_error());
    }

    #[tokio::test]
    async fn join_fetches_immediately_then_periodically() {
        let source = MockSource::always(MockReply::Ok(response(3)));
        let mut scheduler = scheduler(&source, Duration::from_millis(100));

        scheduler.join("Steve");
        assert!(scheduler.is_active());
        wait_for_requests(&source, 1).await;
        assert_eq!(scheduler.shared().current().total_votes(), Some(3));

        wait_for_requests(&source, 3).await;
        assert!(source.requests().iter().all(|u| u == "Steve"));
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn leave_stops_polling() {
        let source = MockSource::always(MockReply::Ok(response(3)));
        let mut scheduler = scheduler(&source, Duration::from_millis(50));

        scheduler.join("Steve");
        wait_for_requests(&source, 1).await;
        scheduler.leave();
        assert!(!scheduler.is_active());

        let count = source.request_count();
        sleep(Duration::from_millis(250)).await;
        assert_eq!(source.request_count(), count);
        assert!(!scheduler.fetch_now());
    }

    #[tokio::test]
    async fn rejoin_keeps_a_single_schedule() {
        let source = MockSource::always(MockReply::Ok(response(3)));
        let mut scheduler = scheduler(&source, Duration::from_secs(3600));

        scheduler.join("Steve");
        scheduler.join("Alex");
        wait_for_requests(&source, 1).await;
        sleep(Duration::from_millis(100)).await;

        // The first schedule was cancelled before its first tick ran
        assert_eq!(source.requests(), vec!["Alex".to_string()]);
        assert_eq!(scheduler.username(), Some("Alex"));
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn in_flight_fetch_completes_after_leave() {
        let source = MockSource::always(MockReply::Ok(response(9)))
            .with_delay(Duration::from_millis(100));
        let mut scheduler = scheduler(&source, Duration::from_secs(3600));

        scheduler.join("Steve");
        wait_for_requests(&source, 1).await;
        scheduler.leave();

        sleep(Duration::from_millis(300)).await;
        assert_eq!(scheduler.shared().current().total_votes(), Some(9));
    }

    #[tokio::test]
    async fn connection_events_follow_the_matcher() {
        let source = MockSource::always(MockReply::Ok(response(1)));
        let mut scheduler = scheduler(&source, Duration::from_secs(3600));

        scheduler.handle(ConnectionEvent::Joined {
            address: "mc.hypixel.net:25565".into(),
            username: "Steve".into(),
        });
        assert!(!scheduler.is_active());

        scheduler.handle(ConnectionEvent::Joined {
            address: "play.excalia.fr:25565".into(),
            username: "Steve".into(),
        });
        assert!(scheduler.is_active());
        wait_for_requests(&source, 1).await;

        scheduler.handle(ConnectionEvent::Left);
        assert!(!scheduler.is_active());
    }

    #[tokio::test]
    async fn blank_username_is_ignored() {
        let source = MockSource::new();
        let mut scheduler = scheduler(&source, Duration::from_secs(3600));
        scheduler.join("   ");
        assert!(!scheduler.is_active());
    }

    #[tokio::test]
    async fn fetch_now_runs_outside_schedule() {
        let source = MockSource::always(MockReply::Ok(response(1)));
        let mut scheduler = scheduler(&source, Duration::from_secs(3600));

        scheduler.join("Steve");
        wait_for_requests(&source, 1).await;
        assert!(scheduler.fetch_now());
        wait_for_requests(&source, 2).await;
        scheduler.shutdown();
    }
}
