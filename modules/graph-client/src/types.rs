use serde::Deserialize;

// --- Group feed ---

/// One page of `/{group-id}/feed`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    pub data: Vec<RawPost>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl FeedPage {
    /// Cursor URL for the following page, if the API returned one.
    pub fn next_url(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|p| p.next.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// A single post as returned by the feed edge. Optional fields are the ones
/// the API omits when the post has no such content.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub created_time: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub from: Author,
    pub message: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub comments: Option<SummaryEdge>,
    pub reactions: Option<SummaryEdge>,
    pub shares: Option<ShareCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub name: String,
    pub id: Option<String>,
}

/// An edge requested with `.limit(0).summary(true)`: only the total survives.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryEdge {
    pub summary: Summary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Summary {
    pub total_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareCount {
    pub count: i64,
}

// --- Reaction breakdown ---

/// Response of the per-post reaction query. Each aliased edge is absent
/// when the API has nothing to report for that type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionBreakdown {
    pub like: Option<SummaryEdge>,
    pub love: Option<SummaryEdge>,
    pub wow: Option<SummaryEdge>,
    pub haha: Option<SummaryEdge>,
    pub sad: Option<SummaryEdge>,
    pub angry: Option<SummaryEdge>,
}

fn total(edge: &Option<SummaryEdge>) -> i64 {
    edge.as_ref().map_or(0, |e| e.summary.total_count)
}

impl ReactionBreakdown {
    pub fn likes(&self) -> i64 {
        total(&self.like)
    }

    pub fn loves(&self) -> i64 {
        total(&self.love)
    }

    pub fn wows(&self) -> i64 {
        total(&self.wow)
    }

    pub fn hahas(&self) -> i64 {
        total(&self.haha)
    }

    pub fn sads(&self) -> i64 {
        total(&self.sad)
    }

    pub fn angrys(&self) -> i64 {
        total(&self.angry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_post_leaves_optional_fields_empty() {
        let raw: RawPost = serde_json::from_str(
            r#"{"id":"1_2","created_time":"2020-03-01T10:00:00+0000","type":"status","from":{"name":"Ann"}}"#,
        )
        .unwrap();

        assert!(raw.message.is_none());
        assert!(raw.comments.is_none());
        assert!(raw.shares.is_none());
        assert!(raw.from.id.is_none());
    }

    #[test]
    fn missing_type_is_rejected() {
        let result = serde_json::from_str::<RawPost>(
            r#"{"id":"1_2","created_time":"2020-03-01T10:00:00+0000","from":{"name":"Ann"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn paging_without_next_has_no_cursor() {
        let page: FeedPage =
            serde_json::from_str(r#"{"data":[],"paging":{"previous":"https://prev"}}"#).unwrap();
        assert_eq!(page.next_url(), None);

        let page: FeedPage = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert_eq!(page.next_url(), None);
    }

    #[test]
    fn breakdown_defaults_absent_types_to_zero() {
        let breakdown: ReactionBreakdown = serde_json::from_str(
            r#"{"id":"1_2","like":{"data":[],"summary":{"total_count":7}},"sad":{"data":[],"summary":{"total_count":1}}}"#,
        )
        .unwrap();

        assert_eq!(breakdown.likes(), 7);
        assert_eq!(breakdown.sads(), 1);
        assert_eq!(breakdown.loves(), 0);
        assert_eq!(breakdown.angrys(), 0);
    }
}
