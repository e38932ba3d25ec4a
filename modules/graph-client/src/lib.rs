pub mod error;
pub mod retry;
pub mod types;

pub use error::{GraphError, Result};
pub use retry::{redact_token, RetryPolicy};
pub use types::{
    Author, FeedPage, Paging, RawPost, ReactionBreakdown, ShareCount, Summary, SummaryEdge,
};

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v2.6";

/// Fields requested for every post on the group feed.
const FEED_FIELDS: &str = "message,link,created_time,type,name,id,\
comments.limit(0).summary(true),shares,reactions.limit(0).summary(true),from";

/// Six count-only reaction edges, aliased so each lands under its own key.
const REACTION_FIELDS: &str = "reactions.type(LIKE).limit(0).summary(total_count).as(like),\
reactions.type(LOVE).limit(0).summary(total_count).as(love),\
reactions.type(WOW).limit(0).summary(total_count).as(wow),\
reactions.type(HAHA).limit(0).summary(total_count).as(haha),\
reactions.type(SAD).limit(0).summary(total_count).as(sad),\
reactions.type(ANGRY).limit(0).summary(total_count).as(angry)";

/// App access token in the `app_id|app_secret` form the Graph API accepts.
pub fn app_token(app_id: &str, app_secret: &str) -> String {
    format!("{app_id}|{app_secret}")
}

/// First page of a group's feed, newest posts first.
pub fn feed_url(base_url: &str, group_id: &str, limit: u32, token: &str) -> String {
    format!(
        "{}/{}/feed/?fields={}&limit={}&access_token={}",
        base_url.trim_end_matches('/'),
        group_id,
        FEED_FIELDS,
        limit,
        token
    )
}

/// Per-type reaction totals for one post.
pub fn reactions_url(base_url: &str, post_id: &str, token: &str) -> String {
    format!(
        "{}/{}/?fields={}&access_token={}",
        base_url.trim_end_matches('/'),
        post_id,
        REACTION_FIELDS,
        token
    )
}

/// Issues the importer's GETs. URLs are built by the caller with
/// [`feed_url`] / [`reactions_url`] or taken verbatim from `paging.next`.
pub struct GraphClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl GraphClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            retry: RetryPolicy::forever(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url` until it answers 200 and return the body.
    ///
    /// Transport failures and non-200 statuses are logged and reissued per
    /// the retry policy; with the default policy this never fails.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        retry::until_ok(&self.retry, url, || self.get_once(url)).await
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(GraphError::from_response(status.as_u16(), &body));
        }

        Ok(resp.text().await?)
    }
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_url_carries_fields_limit_and_token() {
        let url = feed_url("https://graph.facebook.com/v2.6/", "42", 100, "app|secret");
        assert_eq!(
            url,
            "https://graph.facebook.com/v2.6/42/feed/?fields=message,link,created_time,type,name,id,\
comments.limit(0).summary(true),shares,reactions.limit(0).summary(true),from\
&limit=100&access_token=app|secret"
        );
    }

    #[test]
    fn reactions_url_requests_all_six_types() {
        let url = reactions_url(DEFAULT_BASE_URL, "42_7", "t");
        assert!(url.starts_with("https://graph.facebook.com/v2.6/42_7/?fields="));
        for alias in ["like", "love", "wow", "haha", "sad", "angry"] {
            assert!(url.contains(&format!(".as({alias})")), "missing {alias}");
        }
        assert!(url.contains("limit(0)"));
        assert!(url.ends_with("&access_token=t"));
    }

    #[test]
    fn app_token_joins_with_pipe() {
        assert_eq!(app_token("123", "abc"), "123|abc");
    }
}
