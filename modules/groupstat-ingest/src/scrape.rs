use std::time::{Duration, Instant};

use chrono::Utc;
use graph_client::{feed_url, FeedPage, RawPost};
use tracing::debug;

use crate::config::{Config, DEFAULT_PAGE_SIZE};
use crate::enrich::enrich_if_available;
use crate::error::Result;
use crate::normalize::{normalize, NormalizedPost};
use crate::report;
use crate::store::{ImportRun, SaveOutcome};
use crate::traits::{Fetcher, PostSink};

/// What the importer needs to know about the group it walks.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub base_url: String,
    pub group_id: String,
    pub token: String,
    pub page_size: u32,
}

impl ImportSettings {
    pub fn new(base_url: &str, group_id: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            group_id: group_id.to_string(),
            token: token.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            ..Self::new(&config.graph_api_base, &config.group_id, &config.access_token())
        }
    }

    pub fn first_page_url(&self) -> String {
        feed_url(&self.base_url, &self.group_id, self.page_size, &self.token)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub pages: u64,
    pub processed: u64,
    pub inserted: u64,
    pub already_present: u64,
    pub elapsed: Duration,
}

/// Walks a group feed page by page, enriching, normalizing and saving every
/// post in the order the API returns them.
pub struct Importer<'a> {
    fetcher: &'a dyn Fetcher,
    sink: &'a dyn PostSink,
    settings: ImportSettings,
}

impl<'a> Importer<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, sink: &'a dyn PostSink, settings: ImportSettings) -> Self {
        Self {
            fetcher,
            sink,
            settings,
        }
    }

    /// Import every post of the group. Stops after the first page without a
    /// `paging.next` cursor. Any error aborts the run; posts already saved
    /// stay saved.
    pub async fn run(&self) -> Result<ImportSummary> {
        let started_at = Utc::now();
        let clock = Instant::now();
        report::started(&self.settings.group_id, started_at);

        let mut summary = ImportSummary::default();
        let mut url = self.settings.first_page_url();

        loop {
            let body = self.fetcher.fetch(&url).await?;
            let page: FeedPage = serde_json::from_str(&body)?;
            summary.pages += 1;
            debug!(page = summary.pages, posts = page.data.len(), "Processing feed page");

            for raw in &page.data {
                let post = self.process(raw).await?;
                match self.sink.save(&post).await? {
                    SaveOutcome::Inserted => summary.inserted += 1,
                    SaveOutcome::AlreadyPresent => summary.already_present += 1,
                }
                summary.processed += 1;
                report::post_processed(&post.id, &post.published_text(), summary.processed);
            }

            match page.next_url() {
                Some(next) => url = next.to_string(),
                None => break,
            }
        }

        summary.elapsed = clock.elapsed();
        self.sink
            .record_run(&ImportRun {
                group_id: self.settings.group_id.clone(),
                started_at,
                finished_at: Utc::now(),
                posts_processed: summary.processed as i64,
                posts_inserted: summary.inserted as i64,
            })
            .await?;

        report::finished(&summary);
        Ok(summary)
    }

    /// Normalize one raw post and attach its reaction breakdown.
    pub async fn process(&self, raw: &RawPost) -> Result<NormalizedPost> {
        let mut post = normalize(raw)?;
        post.by_type = enrich_if_available(
            self.fetcher,
            &self.settings.base_url,
            &post.id,
            post.published,
            &self.settings.token,
        )
        .await?;
        Ok(post)
    }
}
