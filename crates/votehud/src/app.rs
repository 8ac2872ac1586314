//! Main loop wiring the engine, the poll scheduler and the console host

use anyhow::{Context, Result};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use votehud_api::SharedCooldowns;
use votehud_config::SharedPreferences;
use votehud_core::{ConfigCommand, ConfigOutcome, HudEvent, VoteHudEngine, describe};
use votehud_net::{ConnectionEvent, PollScheduler};
use votehud_util::now_millis;

use crate::console::{ConsoleHost, ConsoleInput, HELP_TEXT};

/// Interval of the unconditional preference save
pub const FALLBACK_SAVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// What a stdin line asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Quit,
}

pub struct App {
    engine: VoteHudEngine,
    scheduler: PollScheduler,
    shared: SharedCooldowns,
    host: ConsoleHost,
    default_username: Option<String>,
}

impl App {
    pub fn new(
        engine: VoteHudEngine,
        scheduler: PollScheduler,
        default_username: Option<String>,
    ) -> Self {
        let shared = scheduler.shared().clone();
        Self {
            engine,
            scheduler,
            shared,
            host: ConsoleHost::new(),
            default_username,
        }
    }

    fn preferences(&self) -> SharedPreferences {
        Arc::clone(self.engine.preferences())
    }

    /// Connect to `address`, polling as `username` or the default username
    pub fn join(&mut self, address: &str, username: Option<&str>) {
        let Some(username) = username
            .map(str::to_string)
            .or_else(|| self.default_username.clone())
        else {
            warn!(address = %address, "No username given, not polling votes");
            self.host.say("No username: use `join <address> <username>` or --username");
            self.host.set_address(Some(address.to_string()));
            return;
        };

        self.host.set_address(Some(address.to_string()));
        self.scheduler.handle(ConnectionEvent::Joined {
            address: address.to_string(),
            username,
        });
    }

    pub fn leave(&mut self) {
        self.host.set_address(None);
        self.scheduler.handle(ConnectionEvent::Left);
    }

    /// Handle one stdin line
    pub fn handle_line(&mut self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Continue;
        }

        if self.host.config_open() {
            self.handle_config_line(line);
            return LineOutcome::Continue;
        }

        match ConsoleInput::parse(line) {
            Some(ConsoleInput::Actions(actions)) => self.host.queue_actions(actions),
            Some(ConsoleInput::Join { address, username }) => {
                self.join(&address, username.as_deref())
            }
            Some(ConsoleInput::Leave) => self.leave(),
            Some(ConsoleInput::Chat) => {
                let open = self.host.toggle_chat();
                self.host
                    .say(if open { "Chat opened" } else { "Chat closed" });
            }
            Some(ConsoleInput::Click) => self.host.queue_click(),
            Some(ConsoleInput::Refresh) => {
                if !self.scheduler.fetch_now() {
                    self.host.say("Not polling: join the vote server first");
                }
            }
            Some(ConsoleInput::Help) => {
                for line in HELP_TEXT {
                    self.host.say(*line);
                }
            }
            Some(ConsoleInput::Quit) => return LineOutcome::Quit,
            None => self.host.say(format!("Unknown input: {} (try `help`)", line)),
        }
        LineOutcome::Continue
    }

    fn handle_config_line(&mut self, line: &str) {
        let prefs = self.preferences();
        let mut prefs = prefs.lock().unwrap_or_else(PoisonError::into_inner);

        let outcome = line
            .parse::<ConfigCommand>()
            .and_then(|command| command.apply(&mut prefs, now_millis()));
        match outcome {
            Ok(ConfigOutcome::Updated(lines)) => {
                for line in lines {
                    self.host.say(line);
                }
            }
            Ok(ConfigOutcome::Closed) => {
                self.host.close_config();
                self.host.say("Settings saved");
            }
            Err(e) => self.host.say(e.to_string()),
        }
    }

    /// Run one display frame and print whatever it produced
    pub fn tick(&mut self) {
        let store = self.shared.current();
        self.host.begin_frame();
        let report = self.engine.frame(&mut self.host, &store, now_millis());
        self.host.end_frame();

        for event in &report.events {
            debug!(event = ?event, "Frame event");
            if let HudEvent::ConfigViewRequested = event {
                let prefs = self.preferences();
                let prefs = prefs.lock().unwrap_or_else(PoisonError::into_inner);
                for line in describe(prefs.preferences()) {
                    self.host.say(line);
                }
            }
        }
    }

    /// Lines produced since the last call
    pub fn take_output(&mut self) -> Vec<String> {
        self.host.take_output()
    }

    fn save_now(&self, reason: &str) {
        let prefs = self.preferences();
        let mut prefs = prefs.lock().unwrap_or_else(PoisonError::into_inner);
        match prefs.save_now() {
            Ok(()) => debug!(reason, "Preferences saved"),
            Err(e) => error!(reason, error = %e, "Failed to save preferences"),
        }
    }

    /// Stop polling and write preferences for process exit
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
        self.save_now("shutdown");
    }

    /// Run until stdin closes, `quit`, or a termination signal
    pub async fn run(mut self, tick: Duration) -> Result<()> {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        let mut tick_timer = tokio::time::interval(tick);
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut fallback_save = tokio::time::interval_at(
            Instant::now() + FALLBACK_SAVE_INTERVAL,
            FALLBACK_SAVE_INTERVAL,
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        info!(tick_ms = tick.as_millis() as u64, "votehud running, type `help` for commands");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down");
                    break;
                }

                _ = tick_timer.tick() => {
                    self.tick();
                }

                _ = fallback_save.tick() => {
                    self.save_now("periodic");
                }

                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            if self.handle_line(&line) == LineOutcome::Quit {
                                break;
                            }
                        }
                        Ok(None) => {
                            debug!("stdin closed");
                            stdin_open = false;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read stdin");
                            stdin_open = false;
                        }
                    }
                }
            }

            for line in self.take_output() {
                println!("{}", line);
            }
        }

        self.shutdown();
        info!("Shutdown complete");
        Ok(())
    }
}
