use graph_client::GraphError;

/// Result type alias for ingestion.
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Graph API error: {0}")]
    Graph(#[from] GraphError),

    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cannot normalize post {post_id}: {reason}")]
    Normalize { post_id: String, reason: String },

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}
