/// Data structures for saved articles
use crate::dates::{format_display, parse_display};
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved page plus the snippets highlighted on it
///
/// Deserialization goes through `StoredArticle`, so records written with the
/// legacy single `highlight` field come out with `highlights` filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredArticle", rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Human-readable "last touched" time
    pub date: String,
    /// Milliseconds since the epoch, written alongside `date`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

/// Wire shape of an article as found in storage and import files
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredArticle {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    saved_at: Option<f64>,
    #[serde(default)]
    highlight: Option<String>,
    #[serde(default)]
    highlights: Option<Vec<String>>,
}

impl From<StoredArticle> for Article {
    fn from(stored: StoredArticle) -> Self {
        let candidates = match stored.highlights {
            Some(list) if !list.is_empty() => list,
            _ => stored.highlight.into_iter().collect(),
        };

        let mut highlights: Vec<String> = Vec::with_capacity(candidates.len());
        for highlight in candidates {
            if !highlight.is_empty() && !highlights.contains(&highlight) {
                highlights.push(highlight);
            }
        }

        Article {
            id: stored.id,
            title: stored.title,
            url: stored.url,
            date: stored.date,
            saved_at: stored.saved_at.map(|ms| ms as i64),
            highlights,
        }
    }
}

impl Article {
    /// Timestamp used for newest-first ordering, if one can be determined
    pub fn sort_key(&self) -> Option<i64> {
        self.saved_at.or_else(|| parse_display(&self.date))
    }

    /// Append a highlight unless the exact text is already saved
    pub fn add_highlight(&mut self, highlight: &str) -> bool {
        if highlight.is_empty() || self.highlights.iter().any(|h| h == highlight) {
            return false;
        }
        self.highlights.push(highlight.to_string());
        true
    }

    pub fn touch(&mut self, date: String, saved_at: Option<i64>) {
        self.date = date;
        self.saved_at = saved_at;
    }

    /// Imported records need every identifying field
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("id", &self.id),
            ("title", &self.title),
            ("url", &self.url),
            ("date", &self.date),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "article is missing {}",
                missing.join(", ")
            )))
        }
    }
}

/// A save request turned into a candidate record
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub url: String,
    pub date: String,
    pub saved_at: i64,
    pub highlight: Option<String>,
}

impl Submission {
    pub fn new(title: &str, url: &str, highlight: Option<&str>, at: DateTime<Local>) -> Self {
        Submission {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            url: url.to_string(),
            date: format_display(&at),
            saved_at: at.timestamp_millis(),
            highlight: highlight
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
        }
    }

    pub fn into_article(self) -> Article {
        Article {
            id: self.id,
            title: self.title,
            url: self.url,
            date: self.date,
            saved_at: Some(self.saved_at),
            highlights: self.highlight.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(json: &str) -> Article {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_legacy_highlight_is_normalized() {
        let article = parse(
            r#"{"id":"a1","title":"Rust","url":"https://rust-lang.org","date":"Oct 16, 2026, 3:04 PM","highlight":"fearless"}"#,
        );

        assert_eq!(article.highlights, vec!["fearless".to_string()]);
        assert_eq!(article.saved_at, None);
    }

    #[test]
    fn test_highlights_win_over_legacy_field() {
        let article = parse(
            r#"{"id":"a1","title":"Rust","url":"https://rust-lang.org","date":"d","highlight":"old","highlights":["new","newer"]}"#,
        );

        assert_eq!(article.highlights, vec!["new".to_string(), "newer".to_string()]);
    }

    #[test]
    fn test_empty_highlights_fall_back_to_legacy() {
        let article = parse(
            r#"{"id":"a1","title":"t","url":"u","date":"d","highlight":"kept","highlights":[]}"#,
        );

        assert_eq!(article.highlights, vec!["kept".to_string()]);
    }

    #[test]
    fn test_stored_duplicates_and_blanks_are_dropped() {
        let article = parse(
            r#"{"id":"a1","title":"t","url":"u","date":"d","highlights":["x","","x","y"]}"#,
        );

        assert_eq!(article.highlights, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let article = parse(r#"{"id":"a1","title":"t","url":"u","date":"d"}"#);
        let json = serde_json::to_value(&article).unwrap();

        assert_eq!(json, serde_json::json!({"id":"a1","title":"t","url":"u","date":"d"}));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let article = parse(
            r#"{"id":"a1","title":"t","url":"u","date":"d","savedAt":1700000000000,"highlight":"h"}"#,
        );
        let json = serde_json::to_value(&article).unwrap();

        assert_eq!(json["savedAt"], 1700000000000i64);
        assert_eq!(json["highlights"], serde_json::json!(["h"]));
        assert!(json.get("highlight").is_none());
    }

    #[test]
    fn test_add_highlight() {
        let mut article = parse(r#"{"id":"a1","title":"t","url":"u","date":"d"}"#);

        assert!(article.add_highlight("foo"));
        assert!(!article.add_highlight("foo"));
        assert!(!article.add_highlight(""));
        assert!(article.add_highlight("bar"));
        assert_eq!(article.highlights, vec!["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn test_validate() {
        let complete = parse(r#"{"id":"a1","title":"t","url":"u","date":"d"}"#);
        assert!(complete.validate().is_ok());

        let partial = parse(r#"{"id":"a1","title":" ","url":"u"}"#);
        match partial.validate() {
            Err(Error::Validation(msg)) => assert_eq!(msg, "article is missing title, date"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_submission_new() {
        let at = Local.with_ymd_and_hms(2026, 10, 16, 15, 4, 0).unwrap();
        let submission = Submission::new("Rust", "https://rust-lang.org", Some("  borrow  "), at);

        assert!(!submission.id.is_empty());
        assert_eq!(submission.date, "Oct 16, 2026, 3:04 PM");
        assert_eq!(submission.saved_at, at.timestamp_millis());
        assert_eq!(submission.highlight, Some("borrow".to_string()));

        let blank = Submission::new("Rust", "https://rust-lang.org", Some("   "), at);
        assert_eq!(blank.highlight, None);
    }

    #[test]
    fn test_submission_ids_are_unique() {
        let at = Local::now();
        let a = Submission::new("t", "u", None, at);
        let b = Submission::new("t", "u", None, at);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sort_key_prefers_saved_at() {
        let mut article = parse(r#"{"id":"a1","title":"t","url":"u","date":"garbage"}"#);
        assert_eq!(article.sort_key(), None);

        article.saved_at = Some(42);
        assert_eq!(article.sort_key(), Some(42));
    }
}
