//! Scriptable cooldown source for tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use votehud_api::VoteResponse;

use crate::{CooldownSource, FetchError, FetchResult};

/// One scripted answer
#[derive(Debug, Clone)]
pub enum MockReply {
    Ok(VoteResponse),
    Timeout,
    Status(u16),
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    fallback: Option<MockReply>,
    requests: Vec<String>,
}

/// Answers fetches from a script and records who was asked for.
///
/// Replies are consumed in order; once the script runs out the fallback
/// reply (if any) repeats, otherwise fetches time out.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    state: Arc<Mutex<MockState>>,
    delay: Duration,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `reply`
    pub fn always(reply: MockReply) -> Self {
        let source = Self::new();
        source.lock().fallback = Some(reply);
        source
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    /// Usernames fetched so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CooldownSource for MockSource {
    async fn fetch(&self, username: &str) -> FetchResult<VoteResponse> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(username.to_string());
            state.replies.pop_front().or_else(|| state.fallback.clone())
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match reply {
            Some(MockReply::Ok(response)) => Ok(response),
            Some(MockReply::Status(code)) => Err(FetchError::Status(code)),
            Some(MockReply::Timeout) | None => Err(FetchError::Timeout),
        }
    }
}
