pub mod config;
pub mod enrich;
pub mod error;
pub mod normalize;
pub mod report;
pub mod scrape;
pub mod store;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{Config, ConfigError};
pub use enrich::ReactionCounts;
pub use error::{IngestError, Result};
pub use normalize::NormalizedPost;
pub use scrape::{ImportSettings, ImportSummary, Importer};
pub use store::{ImportRun, PostStore, SaveOutcome, StoredPost};
pub use traits::{Fetcher, PostSink};
