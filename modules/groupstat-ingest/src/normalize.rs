//! Raw Graph posts -> fixed-shape records.
//!
//! Optional fields default to `""` or `0`, text is folded to ASCII
//! punctuation, and `created_time` is moved from UTC to the fixed UTC-5
//! convention the dashboard reports in.

use chrono::{DateTime, Duration, NaiveDateTime};
use graph_client::RawPost;

use crate::enrich::ReactionCounts;
use crate::error::{IngestError, Result};

/// Hours added to the UTC publish time.
pub const LOCAL_OFFSET_HOURS: i64 = -5;

/// Format of `created_time` as the Graph API sends it.
const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Canonical wall-clock format handed downstream.
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A post ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPost {
    pub id: String,
    pub text: String,
    pub author: String,
    pub author_id: String,
    pub link_name: String,
    pub post_type: String,
    pub link: String,
    pub published: NaiveDateTime,
    pub reactions: i64,
    pub comments: i64,
    pub shares: i64,
    pub by_type: ReactionCounts,
}

impl NormalizedPost {
    pub fn published_text(&self) -> String {
        self.published.format(PUBLISHED_FORMAT).to_string()
    }
}

/// Map typographic quotes and non-breaking spaces to their ASCII forms.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect()
}

/// `2020-03-01T10:00:00+0000` -> `2020-03-01 05:00:00`.
///
/// Inputs carrying a non-zero offset are brought to UTC before the shift.
pub fn normalize_timestamp(created_time: &str) -> std::result::Result<String, chrono::ParseError> {
    let parsed = DateTime::parse_from_str(created_time, API_TIME_FORMAT)?;
    let local = parsed.naive_utc() + Duration::hours(LOCAL_OFFSET_HOURS);
    Ok(local.format(PUBLISHED_FORMAT).to_string())
}

pub fn parse_published(text: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, PUBLISHED_FORMAT)
}

/// Normalize one feed post. Per-type reaction counts start at zero; the
/// enricher fills them in for posts it can get a breakdown for.
pub fn normalize(raw: &RawPost) -> Result<NormalizedPost> {
    let invalid_time = |e: chrono::ParseError| IngestError::Normalize {
        post_id: raw.id.clone(),
        reason: format!("bad created_time {:?}: {e}", raw.created_time),
    };
    let published = normalize_timestamp(&raw.created_time).map_err(invalid_time)?;
    let published = parse_published(&published).map_err(invalid_time)?;

    let text_or_empty = |field: &Option<String>| field.as_deref().map(sanitize_text).unwrap_or_default();

    Ok(NormalizedPost {
        id: raw.id.clone(),
        text: text_or_empty(&raw.message),
        author: sanitize_text(&raw.from.name),
        author_id: raw.from.id.clone().unwrap_or_default(),
        link_name: text_or_empty(&raw.name),
        post_type: raw.post_type.clone(),
        link: text_or_empty(&raw.link),
        published,
        reactions: raw.reactions.as_ref().map_or(0, |e| e.summary.total_count),
        comments: raw.comments.as_ref().map_or(0, |e| e.summary.total_count),
        shares: raw.shares.as_ref().map_or(0, |s| s.count),
        by_type: ReactionCounts::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawPost {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let post = normalize(&raw(
            r#"{"id":"g_1","created_time":"2020-03-01T10:00:00+0000","type":"photo","from":{"name":"Ann"}}"#,
        ))
        .unwrap();

        assert_eq!(post.text, "");
        assert_eq!(post.link, "");
        assert_eq!(post.link_name, "");
        assert_eq!(post.author_id, "");
        assert_eq!(post.reactions, 0);
        assert_eq!(post.comments, 0);
        assert_eq!(post.shares, 0);
        assert_eq!(post.by_type, ReactionCounts::default());
        assert_eq!(post.post_type, "photo");
    }

    #[test]
    fn present_fields_are_carried_over() {
        let post = normalize(&raw(
            r#"{"id":"g_2","created_time":"2020-03-01T10:00:00+0000","type":"link",
                "from":{"name":"Bo","id":"99"},"message":"read this","name":"A title",
                "link":"https://example.com/a",
                "comments":{"data":[],"summary":{"total_count":4}},
                "reactions":{"data":[],"summary":{"total_count":11}},
                "shares":{"count":3}}"#,
        ))
        .unwrap();

        assert_eq!(post.text, "read this");
        assert_eq!(post.link_name, "A title");
        assert_eq!(post.link, "https://example.com/a");
        assert_eq!(post.author, "Bo");
        assert_eq!(post.author_id, "99");
        assert_eq!((post.reactions, post.comments, post.shares), (11, 4, 3));
    }

    #[test]
    fn timestamp_shifts_five_hours_back_and_reparses() {
        let text = normalize_timestamp("2020-03-01T10:00:00+0000").unwrap();
        assert_eq!(text, "2020-03-01 05:00:00");

        let parsed = parse_published(&text).unwrap();
        let expected = chrono::NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(5, 0, 0)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn shift_crosses_midnight() {
        assert_eq!(
            normalize_timestamp("2016-01-01T03:30:00+0000").unwrap(),
            "2015-12-31 22:30:00"
        );
    }

    #[test]
    fn non_utc_offset_is_converted_before_shift() {
        assert_eq!(
            normalize_timestamp("2020-03-01T12:00:00+0200").unwrap(),
            "2020-03-01 05:00:00"
        );
    }

    #[test]
    fn unparseable_time_is_a_normalize_error() {
        let err = normalize(&raw(
            r#"{"id":"g_3","created_time":"yesterday","type":"status","from":{"name":"Ann"}}"#,
        ))
        .unwrap_err();

        assert!(matches!(err, IngestError::Normalize { ref post_id, .. } if post_id == "g_3"));
    }

    #[test]
    fn curly_quotes_and_nbsp_become_ascii() {
        let cleaned = sanitize_text("\u{2018}hi\u{2019}\u{00A0}\u{201C}there\u{201D}");
        assert_eq!(cleaned, "'hi' \"there\"");
        assert!(cleaned.is_ascii());
    }

    #[test]
    fn sanitization_applies_to_every_text_field() {
        let post = normalize(&raw(
            "{\"id\":\"g_4\",\"created_time\":\"2020-03-01T10:00:00+0000\",\"type\":\"link\",\
              \"from\":{\"name\":\"O\u{2019}Neil\"},\"message\":\"it\u{2019}s\",\
              \"name\":\"\u{201C}T\u{201D}\",\"link\":\"a\u{00A0}b\"}",
        ))
        .unwrap();

        assert_eq!(post.author, "O'Neil");
        assert_eq!(post.text, "it's");
        assert_eq!(post.link_name, "\"T\"");
        assert_eq!(post.link, "a b");
    }

    #[test]
    fn other_unicode_passes_through() {
        assert_eq!(sanitize_text("caf\u{e9} \u{2014} \u{1F600}"), "caf\u{e9} \u{2014} \u{1F600}");
    }
}
