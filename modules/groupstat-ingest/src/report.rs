//! Console progress for an import run.
//!
//! Lines carry a `kind` field: `notice` for the run banner, `success` for
//! processed posts and the final summary. Fetch failures are logged as
//! errors by the graph client itself.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::scrape::ImportSummary;

/// A running total is printed every this many posts.
pub const MILESTONE: u64 = 100;

pub fn is_milestone(processed: u64) -> bool {
    processed > 0 && processed % MILESTONE == 0
}

pub fn started(group_id: &str, at: DateTime<Utc>) {
    info!(kind = "notice", group_id, started_at = %at, "Scraping {group_id} Facebook Group");
}

pub fn post_processed(post_id: &str, published: &str, processed: u64) {
    info!(
        kind = "success",
        post_id,
        published,
        at = %Utc::now(),
        "{post_id} post processed"
    );

    if is_milestone(processed) {
        info!(kind = "success", processed, at = %Utc::now(), "{processed} posts processed");
    }
}

pub fn finished(summary: &ImportSummary) {
    info!(
        kind = "success",
        processed = summary.processed,
        inserted = summary.inserted,
        already_present = summary.already_present,
        pages = summary.pages,
        "Done! {} posts processed in {:?}",
        summary.processed,
        summary.elapsed
    );
}
