//! Where cooldown data comes from

use async_trait::async_trait;
use votehud_api::VoteResponse;

use crate::FetchResult;

/// Something that can fetch a player's vote status
#[async_trait]
pub trait CooldownSource: Send + Sync {
    /// Fetch the current vote status for `username`
    async fn fetch(&self, username: &str) -> FetchResult<VoteResponse>;
}
