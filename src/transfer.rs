/// JSON export and import of the article collection
use crate::article::Article;
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde_json::Value;

pub const EXPORT_PREFIX: &str = "article-summarizer-export";

/// `article-summarizer-export-2026-10-16_15-04-05.json`
pub fn export_filename(at: &DateTime<Local>) -> String {
    format!("{}-{}.json", EXPORT_PREFIX, at.format("%Y-%m-%d_%H-%M-%S"))
}

pub fn export_json(articles: &[Article]) -> Result<String> {
    Ok(serde_json::to_string_pretty(articles)?)
}

/// Parse an import file, keeping every entry that has an id, title, url and
/// date. Fails only when the file is not an array or nothing survives.
pub fn parse_import(text: &str) -> Result<Vec<Article>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::Validation(format!("Import file is not valid JSON: {}", e)))?;

    let Value::Array(entries) = value else {
        return Err(Error::Validation(
            "Import file must contain an array of articles".to_string(),
        ));
    };

    let total = entries.len();
    let articles = valid_articles(entries);

    if articles.is_empty() {
        return Err(Error::Validation(
            "No valid articles found in import file".to_string(),
        ));
    }

    log::info!("Accepted {} of {} imported articles", articles.len(), total);
    Ok(articles)
}

/// Decode and check each entry on its own; entries that do not fit are
/// logged and dropped
pub fn valid_articles(entries: Vec<Value>) -> Vec<Article> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let checked = serde_json::from_value::<Article>(entry)
                .map_err(Error::from)
                .and_then(|article| article.validate().map(|_| article));

            match checked {
                Ok(article) => Some(article),
                Err(e) => {
                    log::warn!("Skipping import entry {}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::merge;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn create_test_article(id: &str, url: &str, highlights: &[&str]) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Title {}", id),
            url: url.to_string(),
            date: "Oct 16, 2026, 3:04 PM".to_string(),
            saved_at: Some(1_760_000_000_000),
            highlights: highlights.iter().map(|h| h.to_string()).collect(),
        }
    }

    #[test]
    fn test_export_filename() {
        let at = Local.with_ymd_and_hms(2026, 10, 16, 15, 4, 5).unwrap();
        assert_eq!(
            export_filename(&at),
            "article-summarizer-export-2026-10-16_15-04-05.json"
        );
    }

    #[test]
    fn test_export_is_pretty_array() {
        let json = export_json(&[create_test_article("1", "https://a.com", &[])]).unwrap();

        assert!(json.starts_with("[\n"));
        assert!(json.contains("\"url\": \"https://a.com\""));
    }

    #[test]
    fn test_round_trip() {
        let original = vec![
            create_test_article("1", "https://a.com", &["foo", "bar"]),
            create_test_article("2", "https://b.com", &[]),
        ];

        let imported = parse_import(&export_json(&original).unwrap()).unwrap();
        let mut restored = Vec::new();
        merge(&mut restored, imported);

        let pairs = |articles: &[Article]| -> HashSet<(String, Vec<String>)> {
            articles.iter().map(|a| (a.url.clone(), a.highlights.clone())).collect()
        };
        assert_eq!(pairs(&restored), pairs(&original));
    }

    #[test]
    fn test_import_drops_invalid_entries() {
        let text = r#"[
            {"id": "1", "title": "Good", "url": "https://a.com", "date": "Jan 5, 2024, 9:07 AM", "highlight": "legacy"},
            {"id": "", "title": "No id", "url": "https://b.com", "date": "Jan 5, 2024, 9:07 AM"},
            {"id": "3", "title": "No url", "date": "Jan 5, 2024, 9:07 AM"},
            {"id": 4, "title": "Numeric id", "url": "https://d.com", "date": "Jan 5, 2024, 9:07 AM"},
            "not an object"
        ]"#;

        let articles = parse_import(text).unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://a.com");
        assert_eq!(articles[0].highlights, vec!["legacy".to_string()]);
    }

    #[test]
    fn test_valid_articles_keeps_good_entries_in_order() {
        let entries = vec![
            serde_json::to_value(create_test_article("1", "https://a.com", &[])).unwrap(),
            serde_json::json!({"id": "2", "title": "t", "url": "https://b.com", "date": "d", "highlights": "not a list"}),
            serde_json::to_value(create_test_article("3", "https://c.com", &["x"])).unwrap(),
        ];

        let articles = valid_articles(entries);

        let ids: Vec<&str> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_import_rejects_non_array() {
        let result = parse_import(r#"{"articles": []}"#);
        assert!(matches!(result, Err(Error::Validation(msg)) if msg.contains("array")));
    }

    #[test]
    fn test_import_rejects_when_nothing_validates() {
        assert!(matches!(parse_import("[]"), Err(Error::Validation(_))));
        assert!(matches!(parse_import(r#"[{"title": "x"}]"#), Err(Error::Validation(_))));
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        assert!(matches!(parse_import("[{"), Err(Error::Validation(_))));
    }
}
