//! Vote endpoint wire format
//!
//! `GET <endpoint><username>` answers with:
//!
//! ```json
//! { "votes": 12, "sites": { "2": 1700000005000, "4": 1699999999000 } }
//! ```
//!
//! Both fields are required. A missing field, a non-object `sites`, or a
//! non-integer timestamp rejects the whole body; nothing is partially applied.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use votehud_util::EpochMillis;

use crate::{CooldownStore, SiteId};

/// Errors decoding a vote endpoint body
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed vote response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid vote total: {0}")]
    InvalidTotal(i64),
}

/// Decoded vote endpoint body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoteResponse {
    /// Votes cast this month
    pub votes: i64,

    /// Reset timestamp (epoch ms) per site id
    pub sites: BTreeMap<String, EpochMillis>,
}

impl VoteResponse {
    /// Parse a response body
    pub fn parse(body: &[u8]) -> Result<Self, WireError> {
        let response: VoteResponse = serde_json::from_slice(body)?;
        if response.votes < 0 {
            return Err(WireError::InvalidTotal(response.votes));
        }
        Ok(response)
    }

    /// Build the cooldown snapshot this response describes
    pub fn into_store(self, fetched_at: EpochMillis) -> CooldownStore {
        let sites = self
            .sites
            .into_iter()
            .map(|(id, reset_at)| (SiteId::new(id), reset_at))
            .collect();
        CooldownStore::fresh(self.votes, sites, fetched_at)
    }
}
