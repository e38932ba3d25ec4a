// Per-type reaction breakdowns.
//
// The breakdown query only exists for posts newer than the reactions launch,
// so older posts never trigger a request.

use chrono::{NaiveDate, NaiveDateTime};
use graph_client::{reactions_url, ReactionBreakdown};
use tracing::debug;

use crate::error::Result;
use crate::traits::Fetcher;

/// Counts for the six reaction types. Zero when unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionCounts {
    pub likes: i64,
    pub loves: i64,
    pub wows: i64,
    pub hahas: i64,
    pub sads: i64,
    pub angrys: i64,
}

impl From<&ReactionBreakdown> for ReactionCounts {
    fn from(b: &ReactionBreakdown) -> Self {
        Self {
            likes: b.likes(),
            loves: b.loves(),
            wows: b.wows(),
            hahas: b.hahas(),
            sads: b.sads(),
            angrys: b.angrys(),
        }
    }
}

/// 2016-02-24 00:00:00 in the normalized (UTC-5) convention.
pub fn reactions_cutoff() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 2, 24)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Whether the API can supply a breakdown for a post published at `published`.
pub fn has_breakdown(published: NaiveDateTime) -> bool {
    published > reactions_cutoff()
}

/// Fetch the breakdown for `post_id` unconditionally.
pub async fn enrich(
    fetcher: &dyn Fetcher,
    base_url: &str,
    post_id: &str,
    token: &str,
) -> Result<ReactionCounts> {
    let body = fetcher.fetch(&reactions_url(base_url, post_id, token)).await?;
    let breakdown: ReactionBreakdown = serde_json::from_str(&body)?;
    Ok(ReactionCounts::from(&breakdown))
}

/// Breakdown for a post, or all zeros without a request when it predates the cutoff.
pub async fn enrich_if_available(
    fetcher: &dyn Fetcher,
    base_url: &str,
    post_id: &str,
    published: NaiveDateTime,
    token: &str,
) -> Result<ReactionCounts> {
    if !has_breakdown(published) {
        debug!(post_id, %published, "Post predates reaction breakdowns, skipping");
        return Ok(ReactionCounts::default());
    }
    enrich(fetcher, base_url, post_id, token).await
}
