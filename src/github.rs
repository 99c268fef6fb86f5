/// Mirror saved articles to a file in a GitHub repository
///
/// Uses the REST contents API: read the file's current `sha` (if any), then
/// PUT the new base64-encoded content with that `sha`.

use crate::article::Article;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use gloo_net::http::{Request, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const API_BASE: &str = "https://api.github.com";
const MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Where to sync, and with which token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub token: String,
    /// `owner/name`
    pub repo: String,
    /// File path inside the repository
    pub path: String,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("path", &self.path)
            .finish()
    }
}

impl GitHubConfig {
    pub fn new(token: &str, repo: &str, path: &str) -> Self {
        GitHubConfig {
            token: token.trim().to_string(),
            repo: repo.trim().to_string(),
            path: path.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::Validation("GitHub token is required".to_string()));
        }
        if self.path.trim_matches('/').trim().is_empty() {
            return Err(Error::Validation("File path is required".to_string()));
        }
        match self.repo.split_once('/') {
            Some((owner, name)) if !owner.trim().is_empty() && !name.trim().is_empty() && !name.contains('/') => Ok(()),
            _ => Err(Error::Validation(format!(
                "Repository must look like owner/name, got {:?}",
                self.repo
            ))),
        }
    }

    /// `https://api.github.com/repos/{owner}/{name}/contents/{path}`
    pub fn contents_url(&self) -> Result<Url> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| Error::Validation(format!("Bad API base: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| Error::Validation("API base cannot have a path".to_string()))?
            .pop_if_empty()
            .push("repos")
            .extend(self.repo.trim().split('/'))
            .push("contents")
            .extend(self.path.trim().split('/').filter(|part| !part.is_empty()));

        Ok(url)
    }
}

/// One article in the repository file
#[derive(Debug, Serialize)]
struct RemoteArticle<'a> {
    title: &'a str,
    url: &'a str,
    date: &'a str,
    #[serde(skip_serializing_if = "no_highlights")]
    highlights: &'a [String],
}

fn no_highlights(highlights: &&[String]) -> bool {
    highlights.is_empty()
}

/// Pretty JSON written to the repository file
pub fn render_file(articles: &[Article]) -> Result<String> {
    let remote: Vec<RemoteArticle> = articles
        .iter()
        .map(|a| RemoteArticle {
            title: &a.title,
            url: &a.url,
            date: &a.date,
            highlights: &a.highlights,
        })
        .collect();

    Ok(serde_json::to_string_pretty(&remote)?)
}

pub fn commit_message(count: usize) -> String {
    let noun = if count == 1 { "article" } else { "articles" };
    format!("Update saved articles ({} {})", count, noun)
}

/// Body of the contents API PUT
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PutContents {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Deserialize)]
struct ContentsFile {
    sha: String,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Message from a GitHub error body, or a generic one built from the status
pub fn provider_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Interpret the contents API GET: 404 means the file does not exist yet,
/// any other non-2xx is a remote failure
pub fn sha_from(status: u16, body: &str) -> Result<Option<String>> {
    match status {
        404 => Ok(None),
        200..=299 => serde_json::from_str::<ContentsFile>(body)
            .map(|file| Some(file.sha))
            .map_err(|e| Error::Remote(format!("Unexpected contents response: {}", e))),
        _ => Err(Error::Remote(provider_message(status, body))),
    }
}

/// Interpret the contents API PUT
pub fn put_outcome(status: u16, body: &str) -> Result<()> {
    if (200..=299).contains(&status) {
        Ok(())
    } else {
        Err(Error::Remote(provider_message(status, body)))
    }
}

#[async_trait(?Send)]
pub trait GitHubApi {
    /// Revision marker of the file, or `None` when it does not exist yet
    async fn current_sha(&self, config: &GitHubConfig) -> Result<Option<String>>;

    async fn put_contents(&self, config: &GitHubConfig, body: &PutContents) -> Result<()>;
}

/// Contents API over `fetch`
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooGitHubClient;

impl GlooGitHubClient {
    async fn read(response: Response) -> (u16, String) {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        (status, body)
    }
}

#[async_trait(?Send)]
impl GitHubApi for GlooGitHubClient {
    async fn current_sha(&self, config: &GitHubConfig) -> Result<Option<String>> {
        let url = config.contents_url()?;
        let response = Request::get(url.as_str())
            .header("Authorization", &format!("token {}", config.token))
            .header("Accept", MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| Error::transport("GitHub request failed", e))?;

        let (status, body) = Self::read(response).await;
        sha_from(status, &body)
    }

    async fn put_contents(&self, config: &GitHubConfig, body: &PutContents) -> Result<()> {
        let url = config.contents_url()?;
        let response = Request::put(url.as_str())
            .header("Authorization", &format!("token {}", config.token))
            .header("Accept", MEDIA_TYPE)
            .json(body)
            .map_err(|e| Error::transport("Failed to build GitHub request", e))?
            .send()
            .await
            .map_err(|e| Error::transport("GitHub request failed", e))?;

        let (status, body) = Self::read(response).await;
        put_outcome(status, &body)
    }
}

/// Write `articles` to the configured repository file
pub async fn sync_articles<A>(api: &A, articles: &[Article], config: &GitHubConfig) -> Result<()>
where
    A: GitHubApi + ?Sized,
{
    config.validate()?;

    let sha = api.current_sha(config).await?;
    let body = PutContents {
        message: commit_message(articles.len()),
        content: BASE64.encode(render_file(articles)?),
        sha,
    };
    api.put_contents(config, &body).await?;

    log::info!("Synced {} articles to {}/{}", articles.len(), config.repo, config.path);
    Ok(())
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;

    /// Records PUTs instead of talking to GitHub
    #[derive(Default)]
    pub(crate) struct FakeGitHub {
        pub(crate) sha: Option<String>,
        pub(crate) reject_with: Option<String>,
        pub(crate) puts: RefCell<Vec<PutContents>>,
    }

    #[async_trait(?Send)]
    impl GitHubApi for FakeGitHub {
        async fn current_sha(&self, _config: &GitHubConfig) -> Result<Option<String>> {
            Ok(self.sha.clone())
        }

        async fn put_contents(&self, _config: &GitHubConfig, body: &PutContents) -> Result<()> {
            if let Some(message) = &self.reject_with {
                return Err(Error::Remote(message.clone()));
            }
            self.puts.borrow_mut().push(body.clone());
            Ok(())
        }
    }
}
