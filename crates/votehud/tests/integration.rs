//! Integration tests for votehud
//!
//! These exercise the fetch side, the frame loop and preference
//! persistence together, the way the binary wires them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use votehud_api::{FailurePolicy, ServiceMatcher, SharedCooldowns, SiteCatalog, VoteResponse};
use votehud_config::{
    BackgroundWriter, DEBOUNCE_WINDOW_MS, FlushOutcome, HudAnchor, JsonFileBackend,
    PreferenceStore,
};
use votehud_core::{ERROR_TEXT, HudEvent, VoteHudEngine};
use votehud_host_api::{InputActions, MockHost, SideEffect};
use votehud_net::{ConnectionEvent, MockReply, MockSource, PollScheduler};
use votehud_util::{EpochMillis, now_millis};

fn response(votes: i64, sites: &[(&str, EpochMillis)]) -> VoteResponse {
    VoteResponse {
        votes,
        sites: sites
            .iter()
            .map(|(id, at)| (id.to_string(), *at))
            .collect::<BTreeMap<_, _>>(),
    }
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

fn engine_with(store: PreferenceStore) -> VoteHudEngine {
    VoteHudEngine::new(
        store.into_shared(),
        ServiceMatcher::default(),
        SiteCatalog::default(),
    )
}

#[tokio::test]
async fn join_fetch_and_alert_end_to_end() {
    let start = now_millis();
    let source = MockSource::always(MockReply::Ok(response(
        12,
        &[("2", start + 5_000), ("4", start - 1_000)],
    )));
    let shared = SharedCooldowns::new();
    let mut scheduler = PollScheduler::new(
        Arc::new(source.clone()),
        shared.clone(),
        ServiceMatcher::default(),
    );

    scheduler.handle(ConnectionEvent::Joined {
        address: "[::1]:25565".into(),
        username: "Steve".into(),
    });
    assert!(!scheduler.is_active());

    scheduler.handle(ConnectionEvent::Joined {
        address: "Play.Excalia.FR:25565".into(),
        username: "Steve".into(),
    });
    wait_until(|| !shared.current().is_absent()).await;

    let dir = tempfile::tempdir().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("votehud.json"));
    let mut engine = engine_with(PreferenceStore::load(backend));
    let mut host = MockHost::new();

    // Site 4 is already available: one alert on the first frame
    let report = engine.frame(&mut host, &shared.current(), start);
    let alerts: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e {
            HudEvent::VoteAvailable(alert) => Some(alert.site.as_str().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(alerts, vec!["4"]);
    assert!(host.find_text("12 | 00:05").is_some());

    // Site 2 resets five seconds later: exactly one more alert across many frames
    host.clear_effects();
    let mut later_alerts = 0;
    let mut now = start + 50;
    while now < start + 8_000 {
        let report = engine.frame(&mut host, &shared.current(), now);
        later_alerts += report
            .events
            .iter()
            .filter(|e| matches!(e, HudEvent::VoteAvailable(_)))
            .count();
        now += 50;
    }
    assert_eq!(later_alerts, 1);
    assert!(host.effects().contains(&SideEffect::Title {
        title: "Vote available!".into(),
        subtitle: "Top Serveurs".into(),
    }));

    scheduler.handle(ConnectionEvent::Left);
    assert!(!scheduler.is_active());
}

#[tokio::test]
async fn failed_fetch_shows_error_line() {
    let source = MockSource::new();
    source.push(MockReply::Ok(response(3, &[("2", now_millis() + 60_000)])));
    source.push(MockReply::Timeout);
    let shared = SharedCooldowns::new();
    let mut scheduler = PollScheduler::new(
        Arc::new(source.clone()),
        shared.clone(),
        ServiceMatcher::default(),
    )
    .with_policy(FailurePolicy::Discard);

    scheduler.join("Steve");
    wait_until(|| shared.current().total_votes() == Some(3)).await;
    scheduler.fetch_now();
    wait_until(|| shared.current().has_error()).await;

    let store = shared.current();
    assert_eq!(store.total_votes_or_sentinel(), -1);
    assert!(store.sites().is_none());

    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_with(PreferenceStore::load(JsonFileBackend::new(
        dir.path().join("votehud.json"),
    )));
    let mut host = MockHost::new();
    engine.frame(&mut host, &store, now_millis());
    assert!(host.find_text(ERROR_TEXT).is_some());

    scheduler.shutdown();
}

#[test]
fn scenario_c_scale_burst_persists_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votehud.json");
    let mut engine = engine_with(PreferenceStore::load(JsonFileBackend::new(&path)));
    let mut host = MockHost::new();
    let store = votehud_api::CooldownStore::uninitialized();
    let t0: EpochMillis = 1_700_000_000_000;

    // Five presses 20 ms apart, starting from the default 0.6
    for i in 0..5 {
        host.press(InputActions::INCREASE_SCALE);
        let report = engine.frame(&mut host, &store, t0 + i * 20);
        assert_eq!(report.flush, FlushOutcome::Deferred);
    }
    assert!(!path.exists());

    let last = t0 + 80;
    let report = engine.frame(&mut host, &store, last + DEBOUNCE_WINDOW_MS - 1);
    assert_eq!(report.flush, FlushOutcome::Deferred);
    let report = engine.frame(&mut host, &store, last + DEBOUNCE_WINDOW_MS);
    assert_eq!(report.flush, FlushOutcome::Written);

    let reloaded = PreferenceStore::load(JsonFileBackend::new(&path));
    assert!((reloaded.preferences().hud_scale() - 1.1).abs() < 1e-4);
}

#[test]
fn corrupted_field_falls_back_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votehud.json");
    std::fs::write(
        &path,
        r#"{"hudScale":"big","hudAnchor":3,"autoMessage":"/vote","timerDuration":45}"#,
    )
    .unwrap();

    let store = PreferenceStore::load(JsonFileBackend::new(&path));
    let prefs = store.preferences();
    assert!((prefs.hud_scale() - 0.6).abs() < 1e-4);
    assert_eq!(prefs.anchor(), HudAnchor::BottomRight);
    assert_eq!(prefs.auto_message(), "/vote");
    assert_eq!(prefs.timer_duration_minutes(), 45);
}

#[test]
fn background_writer_flushes_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("votehud.json");

    {
        let writer = BackgroundWriter::spawn(JsonFileBackend::new(&path)).unwrap();
        let mut store = PreferenceStore::load(writer);
        store.set_anchor(HudAnchor::TopRight, 0);
        store.set_auto_message("/vote", 1);
        store.save_now().unwrap();
    }

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["hudAnchor"], 1);
    assert_eq!(document["autoMessage"], "/vote");
}

#[test]
fn compass_click_persists_timer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votehud.json");
    let mut store = PreferenceStore::load(JsonFileBackend::new(&path));
    store.set_auto_message("/vote", 0);
    let mut engine = engine_with(store);

    let mut host = MockHost::new();
    host.chat_open = true;
    let rect = votehud_core::compass_rect(host.viewport, votehud_host_api::MOCK_FONT_HEIGHT, true);
    host.cursor = votehud_host_api::CursorPos::new(rect.x + 1, rect.y + 1);
    host.button_down = true;

    let t0: EpochMillis = 1_700_000_000_000;
    let cooldowns = votehud_api::CooldownStore::uninitialized();
    let report = engine.frame(&mut host, &cooldowns, t0);
    assert!(report.events.contains(&HudEvent::VoteMessageSent {
        message: Some("/vote".into())
    }));
    assert_eq!(host.effects(), &[SideEffect::Chat("/vote".into())]);

    host.button_down = false;
    engine.frame(&mut host, &cooldowns, t0 + DEBOUNCE_WINDOW_MS);

    let reloaded = PreferenceStore::load(JsonFileBackend::new(&path));
    assert!(reloaded.preferences().timer_active());
    assert_eq!(reloaded.preferences().timer_start(), t0);
}
