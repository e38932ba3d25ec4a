use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with its own `{"error": {...}}` envelope.
    #[error("Graph API {kind} (code {code}, status {status}): {message}")]
    Graph {
        status: u16,
        code: i64,
        kind: String,
        message: String,
    },

    /// Non-200 whose body is not a Graph error envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Gave up on {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    code: i64,
}

impl GraphError {
    /// Classify a non-200 response by its body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => GraphError::Graph {
                status,
                code: error.code,
                kind: error.kind,
                message: error.message,
            },
            Err(_) => GraphError::Http {
                status,
                body: body.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        GraphError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_envelope_keeps_code_and_message() {
        let err = GraphError::from_response(
            400,
            r#"{"error":{"message":"(#4) Application request limit reached","type":"OAuthException","code":4,"fbtrace_id":"x"}}"#,
        );

        match err {
            GraphError::Graph {
                status,
                code,
                kind,
                message,
            } => {
                assert_eq!((status, code), (400, 4));
                assert_eq!(kind, "OAuthException");
                assert!(message.contains("request limit"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plain_body_falls_back_to_http() {
        let err = GraphError::from_response(502, "Bad Gateway");
        assert!(matches!(err, GraphError::Http { status: 502, ref body } if body == "Bad Gateway"));
    }
}
