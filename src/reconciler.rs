/// Article collection operations: upsert, delete, import merge, ordering
///
/// Every function takes the whole collection, because storage holds it as a
/// single document. URLs stay unique and the collection ends up newest-first.
use crate::article::{Article, Submission};
use crate::dates::now_millis;
use std::cmp::Reverse;
use std::collections::HashSet;
use uuid::Uuid;

/// What an upsert did to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    HighlightAdded,
    HighlightAlreadyPresent,
    /// Plain re-save of a known URL; the existing record is left untouched
    AlreadySaved,
}

/// Insert a new article or fold the submission's highlight into the record
/// that already has its URL
pub fn upsert(articles: &mut Vec<Article>, submission: Submission) -> Upsert {
    let outcome = match articles.iter_mut().find(|a| a.url == submission.url) {
        None => {
            articles.insert(0, submission.into_article());
            Upsert::Inserted
        }
        Some(existing) => match submission.highlight.as_deref() {
            None => Upsert::AlreadySaved,
            Some(highlight) => {
                let added = existing.add_highlight(highlight);
                existing.touch(submission.date, Some(submission.saved_at));
                if added {
                    Upsert::HighlightAdded
                } else {
                    Upsert::HighlightAlreadyPresent
                }
            }
        },
    };

    sort_newest_first(articles);
    outcome
}

/// Drop the article with `id`; returns whether anything was removed
pub fn remove(articles: &mut Vec<Article>, id: &str) -> bool {
    let original_len = articles.len();
    articles.retain(|a| a.id != id);
    articles.len() < original_len
}

/// Append imported articles whose URL is not stored yet; returns how many
/// were added
///
/// An imported record whose id is already taken gets a fresh one, so ids stay
/// unique alongside URLs.
pub fn merge(articles: &mut Vec<Article>, imported: Vec<Article>) -> usize {
    let mut seen_urls: HashSet<String> = articles.iter().map(|a| a.url.clone()).collect();
    let mut seen_ids: HashSet<String> = articles.iter().map(|a| a.id.clone()).collect();
    let original_len = articles.len();

    for mut article in imported {
        if !seen_urls.insert(article.url.clone()) {
            continue;
        }
        if !seen_ids.insert(article.id.clone()) {
            let fresh = Uuid::new_v4().to_string();
            log::info!("Imported id {} already taken, using {}", article.id, fresh);
            article.id = fresh.clone();
            seen_ids.insert(fresh);
        }
        articles.push(article);
    }

    sort_newest_first(articles);
    articles.len() - original_len
}

/// Stable newest-first sort
///
/// Articles without a usable timestamp sort as if saved right now. "Now" is
/// sampled once per call, so such records can move between calls.
pub fn sort_newest_first(articles: &mut [Article]) {
    let now = now_millis();
    articles.sort_by_cached_key(|a| {
        let key = a.sort_key().unwrap_or_else(|| {
            log::warn!("Unparsable date {:?} on {}, sorting as now", a.date, a.url);
            now
        });
        Reverse(key)
    });
}
