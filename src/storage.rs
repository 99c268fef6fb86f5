/// Storage gateway over chrome.storage.local
///
/// The article collection is one JSON document under `articles`. All
/// read-modify-write sequences go through `ArticleStore`, which holds an async
/// lock across the read and the write so overlapping requests cannot drop
/// each other's changes.

use crate::article::Article;
use crate::error::{Error, Result};
use crate::github::GitHubConfig;
use crate::reconciler::sort_newest_first;
use async_trait::async_trait;
use futures::lock::Mutex;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

pub const ARTICLES_KEY: &str = "articles";
pub const GITHUB_CONFIG_KEY: &str = "githubConfig";

// Import JS bridge functions
#[wasm_bindgen(module = "/js/storage.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> std::result::Result<(), JsValue>;
}

/// Key-value area holding JSON documents
#[async_trait(?Send)]
pub trait StorageArea {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// `chrome.storage.local`, reached through the JS bridge
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

#[async_trait(?Send)]
impl StorageArea for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = getStorage(key)
            .await
            .map_err(|e| Error::storage("Failed to get storage", e))?;

        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|e| Error::storage("Failed to parse storage", e))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = value
            .serialize(&serializer)
            .map_err(|e| Error::storage("Failed to serialize storage", e))?;

        setStorage(key, value)
            .await
            .map_err(|e| Error::storage("Failed to save storage", e))
    }
}

/// Serialized access to the persisted articles and GitHub settings
pub struct ArticleStore<S> {
    area: S,
    gate: Mutex<()>,
}

impl<S: StorageArea> ArticleStore<S> {
    pub fn new(area: S) -> Self {
        ArticleStore {
            area,
            gate: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn area(&self) -> &S {
        &self.area
    }

    /// All articles, newest first
    pub async fn articles(&self) -> Result<Vec<Article>> {
        let _guard = self.gate.lock().await;
        let mut articles = self.read().await?;
        sort_newest_first(&mut articles);
        Ok(articles)
    }

    /// Read the collection, apply `change`, and write the result back
    pub async fn update<T>(&self, change: impl FnOnce(&mut Vec<Article>) -> T) -> Result<T> {
        let _guard = self.gate.lock().await;
        let mut articles = self.read().await?;
        let outcome = change(&mut articles);
        self.write(&articles).await?;
        Ok(outcome)
    }

    pub async fn github_config(&self) -> Result<Option<GitHubConfig>> {
        match self.area.get(GITHUB_CONFIG_KEY).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    pub async fn set_github_config(&self, config: &GitHubConfig) -> Result<()> {
        self.area
            .set(GITHUB_CONFIG_KEY, serde_json::to_value(config)?)
            .await
    }

    /// Records are decoded one at a time; a malformed one is logged and left
    /// out instead of failing the whole collection
    async fn read(&self) -> Result<Vec<Article>> {
        let entries = match self.area.get(ARTICLES_KEY).await? {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(Error::Storage("Stored articles are not a list".to_string())),
        };

        let articles = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Article>(entry) {
                Ok(article) => Some(article),
                Err(e) => {
                    log::warn!("Skipping stored article {}: {}", index, e);
                    None
                }
            })
            .collect();
        Ok(articles)
    }

    async fn write(&self, articles: &[Article]) -> Result<()> {
        self.area
            .set(ARTICLES_KEY, serde_json::to_value(articles)?)
            .await
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryStorage;

#[cfg(test)]
mod memory {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// In-memory storage area that yields once per call, like a real
    /// asynchronous storage API would
    #[derive(Default)]
    pub(crate) struct MemoryStorage {
        values: RefCell<HashMap<String, Value>>,
        pub(crate) writes: Cell<usize>,
        pub(crate) fail_reads: Cell<bool>,
        pub(crate) fail_writes: Cell<bool>,
    }

    impl MemoryStorage {
        pub(crate) fn with(key: &str, value: Value) -> Self {
            let storage = MemoryStorage::default();
            storage.values.borrow_mut().insert(key.to_string(), value);
            storage
        }

        pub(crate) fn raw(&self, key: &str) -> Option<Value> {
            self.values.borrow().get(key).cloned()
        }
    }

    #[async_trait(?Send)]
    impl StorageArea for MemoryStorage {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            YieldNow(false).await;
            if self.fail_reads.get() {
                return Err(Error::Storage("storage area unavailable".to_string()));
            }
            Ok(self.raw(key))
        }

        async fn set(&self, key: &str, value: Value) -> Result<()> {
            YieldNow(false).await;
            if self.fail_writes.get() {
                return Err(Error::Storage("QUOTA_BYTES quota exceeded".to_string()));
            }
            self.values.borrow_mut().insert(key.to_string(), value);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    struct YieldNow(bool);

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
}
