/// Cross-context message protocol
///
/// Requests travel as `{type, payload?}`. Mutations are answered with
/// `{success, error?}`; reads with `{type: "<TAG>_RESPONSE", payload}`.

use crate::article::Article;
use crate::error::Error;
use crate::github::GitHubConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    SaveArticle(SavePayload),
    GetArticles,
    DeleteArticle(DeletePayload),
    ImportArticles(ImportPayload),
    SaveGithubConfig(GitHubConfig),
    GetGithubConfig,
    SyncToGithub(SyncPayload),
}

impl Request {
    pub fn tag(&self) -> &'static str {
        match self {
            Request::SaveArticle(_) => "SAVE_ARTICLE",
            Request::GetArticles => "GET_ARTICLES",
            Request::DeleteArticle(_) => "DELETE_ARTICLE",
            Request::ImportArticles(_) => "IMPORT_ARTICLES",
            Request::SaveGithubConfig(_) => "SAVE_GITHUB_CONFIG",
            Request::GetGithubConfig => "GET_GITHUB_CONFIG",
            Request::SyncToGithub(_) => "SYNC_TO_GITHUB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPayload {
    /// Raw entries; each one is checked on its own when the import is applied
    pub articles: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub articles: Vec<Article>,
    pub config: GitHubConfig,
}

/// Outcome of a mutating request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Ack {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: &Error) -> Self {
        Ack {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Data returned by read-style requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reply {
    GetArticlesResponse(Vec<Article>),
    GetGithubConfigResponse(Option<GitHubConfig>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Data(Reply),
    Ack(Ack),
}

impl Response {
    /// Turn a reply into a result, for callers that only care about success
    pub fn into_result(self) -> Result<Option<Reply>, Error> {
        match self {
            Response::Data(reply) => Ok(Some(reply)),
            Response::Ack(Ack { success: true, .. }) => Ok(None),
            Response::Ack(Ack { error, .. }) => Err(Error::Rejected(
                error.unwrap_or_else(|| "request failed".to_string()),
            )),
        }
    }
}

/// Messages handled by the content script of a tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentRequest {
    /// Ask for the text currently selected on the page
    SaveHighlight,
    /// Show a toast after a background save
    ShowFeedback { success: bool, message: String },
}

impl ContentRequest {
    pub fn feedback(ack: &Ack) -> Self {
        let message = if ack.success {
            "Highlight saved!"
        } else {
            "Error saving highlight"
        };
        ContentRequest::ShowFeedback {
            success: ack.success,
            message: message.to_string(),
        }
    }
}

/// Answer to `SAVE_HIGHLIGHT`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<String, Error>> for SelectionReply {
    fn from(selection: Result<String, Error>) -> Self {
        match selection {
            Ok(text) => SelectionReply {
                success: true,
                highlight: Some(text),
                error: None,
            },
            Err(e) => SelectionReply {
                success: false,
                highlight: None,
                error: Some(e.to_string()),
            },
        }
    }
}
