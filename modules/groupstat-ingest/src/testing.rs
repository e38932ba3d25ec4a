// Test mocks for the importer.
//
// - MockFetcher (Fetcher): URL -> response body, records every call
// - MemorySink (PostSink): in-memory insert-or-ignore keyed on post id
// - LogCapture: collects formatted tracing output for line counting
//
// Plus JSON builders for feed pages and reaction breakdowns.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use graph_client::GraphError;
use serde_json::{json, Value};
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{IngestError, Result};
use crate::normalize::NormalizedPost;
use crate::store::{ImportRun, SaveOutcome};
use crate::traits::{Fetcher, PostSink};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// HashMap-based fetcher. Unregistered URLs fail with an HTTP 404.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses.insert(url.to_string(), body.into());
        self
    }

    /// Every URL fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses.get(url).cloned().ok_or_else(|| {
            IngestError::Graph(GraphError::Http {
                status: 404,
                body: format!("MockFetcher: no response registered for {url}"),
            })
        })
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// In-memory stand-in for PostStore.
#[derive(Default)]
pub struct MemorySink {
    posts: Mutex<BTreeMap<String, NormalizedPost>>,
    order: Mutex<Vec<String>>,
    runs: Mutex<Vec<ImportRun>>,
    fail_on: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with a database error when asked to save `post_id`.
    pub fn failing_on(post_id: &str) -> Self {
        Self {
            fail_on: Some(post_id.to_string()),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<NormalizedPost> {
        self.posts.lock().unwrap().get(id).cloned()
    }

    /// Ids in the order they were first inserted.
    pub fn insertion_order(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    pub fn runs(&self) -> Vec<ImportRun> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSink for MemorySink {
    async fn save(&self, post: &NormalizedPost) -> Result<SaveOutcome> {
        if self.fail_on.as_deref() == Some(post.id.as_str()) {
            return Err(IngestError::Store(sqlx::Error::Protocol(format!(
                "MemorySink: injected failure for {}",
                post.id
            ))));
        }

        let mut posts = self.posts.lock().unwrap();
        if posts.contains_key(&post.id) {
            return Ok(SaveOutcome::AlreadyPresent);
        }
        posts.insert(post.id.clone(), post.clone());
        self.order.lock().unwrap().push(post.id.clone());
        Ok(SaveOutcome::Inserted)
    }

    async fn record_run(&self, run: &ImportRun) -> Result<()> {
        self.runs.lock().unwrap().push(run.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogCapture
// ---------------------------------------------------------------------------

/// Collects formatted log output. Install with [`LogCapture::install`] and
/// keep the guard alive for the duration of the test.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ---------------------------------------------------------------------------
// JSON builders
// ---------------------------------------------------------------------------

/// A feed post with only the required fields.
pub fn raw_post(id: &str, created_time: &str) -> Value {
    json!({
        "id": id,
        "created_time": created_time,
        "type": "status",
        "from": { "name": "Test Author", "id": "1000" },
    })
}

/// A feed page body; `next` becomes `paging.next` when given.
pub fn feed_page(posts: Vec<Value>, next: Option<&str>) -> String {
    let mut page = json!({ "data": posts });
    if let Some(next) = next {
        page["paging"] = json!({ "previous": "https://graph.test/prev", "next": next });
    }
    page.to_string()
}

/// The last page of a real feed: `paging` is present but only carries
/// `previous`.
pub fn last_feed_page(posts: Vec<Value>) -> String {
    json!({
        "data": posts,
        "paging": { "previous": "https://graph.test/prev" },
    })
    .to_string()
}

/// A reaction breakdown body with the given `(alias, count)` pairs.
pub fn breakdown(counts: &[(&str, i64)]) -> String {
    let mut body = json!({ "id": "breakdown" });
    for (alias, count) in counts {
        body[*alias] = json!({ "data": [], "summary": { "total_count": count } });
    }
    body.to_string()
}
