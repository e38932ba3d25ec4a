// Trait boundaries for the importer.
//
// Fetcher replaces the concrete GraphClient, PostSink replaces PostStore.
// Tests swap in MockFetcher and MemorySink: no network, no database.

use async_trait::async_trait;
use graph_client::GraphClient;

use crate::error::Result;
use crate::normalize::NormalizedPost;
use crate::store::{ImportRun, PostStore, SaveOutcome};

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Body of a successful GET on `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl Fetcher for GraphClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        Ok(GraphClient::fetch(self, url).await?)
    }
}

// ---------------------------------------------------------------------------
// PostSink
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PostSink: Send + Sync {
    /// Insert the post unless one with the same id already exists.
    async fn save(&self, post: &NormalizedPost) -> Result<SaveOutcome>;

    /// Record a finished import.
    async fn record_run(&self, run: &ImportRun) -> Result<()>;
}

#[async_trait]
impl PostSink for PostStore {
    async fn save(&self, post: &NormalizedPost) -> Result<SaveOutcome> {
        self.insert_or_ignore(post).await
    }

    async fn record_run(&self, run: &ImportRun) -> Result<()> {
        self.insert_run(run).await
    }
}
