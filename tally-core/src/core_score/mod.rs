//! Business lookups
//!
//! The memoized score computation and the per-client interests fetch.
//! Scoring never fails: a cold or broken cache just means recomputing.
//! Interests lookups go through the plain store path, so store failures
//! there are the caller's problem.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::core_store::{Store, StoreError};

/// How long a computed score stays cached
pub const SCORE_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Errors from the interests lookup
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("malformed interests payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Inputs to the score computation. All optional; absent components
/// contribute nothing to the score or the cache key.
#[derive(Debug, Clone, Default)]
pub struct ScoreQuery {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<i64>,
}

impl ScoreQuery {
    /// Memoization key over the identity components. The concatenation
    /// order is fixed; changing it orphans every score already cached.
    pub fn cache_key(&self) -> String {
        let birthday = self
            .birthday
            .map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_default();
        let joined = format!(
            "{}{}{}{}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or(""),
            self.phone.as_deref().unwrap_or(""),
            birthday,
        );
        format!("uid:{:x}", md5::compute(joined.as_bytes()))
    }
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Compute (or recall) the score for one caller
pub async fn get_score(store: &dyn Store, query: &ScoreQuery) -> f64 {
    let key = query.cache_key();

    if let Some(cached) = store.cache_get(&key).await {
        match cached.parse::<f64>() {
            Ok(score) => return score,
            Err(_) => debug!(%key, %cached, "cached score is not a number, recomputing"),
        }
    }

    let mut score = 0.0;
    if filled(&query.phone) {
        score += 1.5;
    }
    if filled(&query.email) {
        score += 1.5;
    }
    if query.birthday.is_some() && query.gender.is_some() {
        score += 1.5;
    }
    if filled(&query.first_name) && filled(&query.last_name) {
        score += 0.5;
    }

    // Debug formatting keeps the trailing .0 on whole scores; existing
    // cache entries are written that way.
    store.cache_set(&key, &format!("{score:?}"), SCORE_CACHE_TTL).await;
    score
}

/// Interests stored for one client id, decoded from the store's JSON
/// payload. Absent and empty records both mean no interests.
pub async fn get_interests(store: &dyn Store, client_id: i64) -> Result<Vec<String>, ScoreError> {
    let raw = store.get(&format!("i:{client_id}")).await?;
    match raw {
        Some(payload) if !payload.is_empty() => Ok(serde_json::from_str(&payload)?),
        _ => Ok(Vec::new()),
    }
}
