//! votehud - Vote cooldown overlay
//!
//! Wires together:
//! - Preference loading and debounced persistence
//! - The vote endpoint client and poll scheduler
//! - The overlay engine, driven at a fixed frame rate
//! - A terminal host standing in for the game client

mod app;
mod console;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use votehud_api::{
    DEFAULT_SERVICE_DOMAIN, FailurePolicy, ServiceMatcher, SharedCooldowns, SiteCatalog,
};
use votehud_config::{BackgroundWriter, JsonFileBackend, PreferenceStore};
use votehud_core::VoteHudEngine;
use votehud_net::{DEFAULT_ENDPOINT, FetchClient, PollScheduler};
use votehud_util::{default_config_path, format_epoch_millis, is_mock_time_active, now_millis};

use crate::app::App;

/// votehud - Vote cooldown overlay
#[derive(Parser, Debug)]
#[command(name = "votehud")]
#[command(about = "Tracks vote cooldowns and shows them as an overlay", long_about = None)]
struct Args {
    /// Preferences file path (default: ~/.config/votehud/votehud.json)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Player name to fetch votes for (or set VOTEHUD_USERNAME env var)
    #[arg(short, long, env = "VOTEHUD_USERNAME")]
    username: Option<String>,

    /// Server address to join at startup
    #[arg(short, long)]
    server: Option<String>,

    /// Vote endpoint base; the username is appended
    #[arg(long, env = "VOTEHUD_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Seconds between vote fetches
    #[arg(long, default_value = "300")]
    poll_interval_secs: u64,

    /// Milliseconds between overlay frames
    #[arg(long, default_value = "50")]
    tick_ms: u64,

    /// Keep the last good data when a fetch fails
    #[arg(long)]
    retain_on_failure: bool,

    /// Vote service domain; subdomains match too (repeatable)
    #[arg(long = "service-domain", default_values_t = [DEFAULT_SERVICE_DOMAIN.to_string()])]
    service_domains: Vec<String>,

    /// Vote service IP address (repeatable)
    #[arg(long = "service-ip")]
    service_ips: Vec<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the overlay, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "votehud starting");

    if is_mock_time_active() {
        warn!(
            now = %format_epoch_millis(now_millis()),
            "Mock time is active, cooldowns are computed against the mocked clock"
        );
    }

    let writer = BackgroundWriter::spawn(JsonFileBackend::new(&args.config))
        .context("Failed to start preferences writer")?;
    let prefs = PreferenceStore::load(writer).into_shared();
    info!(config_path = %args.config.display(), "Preferences loaded");

    let matcher = ServiceMatcher::new(&args.service_domains, &args.service_ips);
    let policy = if args.retain_on_failure {
        FailurePolicy::RetainLastGood
    } else {
        FailurePolicy::Discard
    };

    let client = FetchClient::new(&args.endpoint)
        .with_context(|| format!("Failed to create client for {}", args.endpoint))?;
    let scheduler = PollScheduler::new(Arc::new(client), SharedCooldowns::new(), matcher.clone())
        .with_period(Duration::from_secs(args.poll_interval_secs.max(1)))
        .with_policy(policy);

    let engine = VoteHudEngine::new(prefs, matcher, SiteCatalog::default());
    let mut app = App::new(engine, scheduler, args.username);

    if let Some(server) = &args.server {
        app.join(server, None);
    }

    app.run(Duration::from_millis(args.tick_ms.max(1))).await
}
