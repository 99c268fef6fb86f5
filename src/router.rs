/// Background message router
///
/// One entry point for every tagged request from the popup and content
/// scripts. Each request gets exactly one response; handler errors become a
/// failed acknowledgement instead of escaping.

use crate::article::Submission;
use crate::error::{Error, Result};
use crate::github::{GitHubApi, GitHubConfig, sync_articles};
use crate::messages::{Ack, DeletePayload, ImportPayload, Reply, Request, Response, SavePayload, SyncPayload};
use crate::reconciler::{Upsert, merge, remove, upsert};
use crate::storage::{ArticleStore, StorageArea};
use crate::transfer::valid_articles;
use chrono::Local;
use serde_json::Value;

pub struct Router<S, G> {
    store: ArticleStore<S>,
    github: G,
}

impl<S: StorageArea, G: GitHubApi> Router<S, G> {
    pub fn new(store: ArticleStore<S>, github: G) -> Self {
        Router { store, github }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &ArticleStore<S> {
        &self.store
    }

    /// Decode a raw message and dispatch it
    pub async fn handle_json(&self, message: Value) -> Response {
        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                log::error!("Unrecognized message: {}", e);
                Response::Ack(Ack::failed(&Error::Validation(format!(
                    "Unrecognized message: {}",
                    e
                ))))
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        let tag = request.tag();
        log::debug!("Handling {}", tag);

        match request {
            Request::GetArticles => Response::Data(Reply::GetArticlesResponse(
                self.store.articles().await.unwrap_or_else(|e| {
                    log::error!("Error getting articles: {}", e);
                    Vec::new()
                }),
            )),
            Request::GetGithubConfig => Response::Data(Reply::GetGithubConfigResponse(
                self.store.github_config().await.unwrap_or_else(|e| {
                    log::error!("Error getting GitHub config: {}", e);
                    None
                }),
            )),
            Request::SaveArticle(payload) => acknowledge(tag, self.save_article(payload).await),
            Request::DeleteArticle(payload) => acknowledge(tag, self.delete_article(payload).await),
            Request::ImportArticles(payload) => acknowledge(tag, self.import_articles(payload).await),
            Request::SaveGithubConfig(config) => acknowledge(tag, self.save_github_config(config).await),
            Request::SyncToGithub(payload) => acknowledge(tag, self.sync_to_github(payload).await),
        }
    }

    async fn save_article(&self, payload: SavePayload) -> Result<()> {
        if payload.url.trim().is_empty() {
            return Err(Error::Validation("Cannot save a page without a URL".to_string()));
        }

        let submission = Submission::new(
            &payload.title,
            &payload.url,
            payload.highlight.as_deref(),
            Local::now(),
        );
        let outcome = self
            .store
            .update(|articles| upsert(articles, submission))
            .await?;

        match outcome {
            Upsert::Inserted => log::info!("Saved {}", payload.url),
            Upsert::HighlightAdded => log::info!("Added highlight to {}", payload.url),
            Upsert::HighlightAlreadyPresent => log::info!("Highlight already saved for {}", payload.url),
            Upsert::AlreadySaved => log::info!("{} is already saved", payload.url),
        }
        Ok(())
    }

    async fn delete_article(&self, payload: DeletePayload) -> Result<()> {
        let removed = self
            .store
            .update(|articles| remove(articles, &payload.id))
            .await?;

        if !removed {
            log::warn!("No article with id {}", payload.id);
        }
        Ok(())
    }

    async fn import_articles(&self, payload: ImportPayload) -> Result<()> {
        let received = payload.articles.len();
        let valid = valid_articles(payload.articles);

        if valid.is_empty() {
            return Err(Error::Validation("No valid articles to import".to_string()));
        }

        let added = self.store.update(|articles| merge(articles, valid)).await?;
        log::info!("Imported {} new articles out of {}", added, received);
        Ok(())
    }

    async fn save_github_config(&self, config: GitHubConfig) -> Result<()> {
        config.validate()?;
        self.store.set_github_config(&config).await
    }

    async fn sync_to_github(&self, payload: SyncPayload) -> Result<()> {
        sync_articles(&self.github, &payload.articles, &payload.config).await
    }
}

fn acknowledge(tag: &str, result: Result<()>) -> Response {
    match result {
        Ok(()) => Response::Ack(Ack::ok()),
        Err(e) => {
            log::error!("Error handling {}: {}", tag, e);
            Response::Ack(Ack::failed(&e))
        }
    }
}
