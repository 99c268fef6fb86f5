/// Article Summarizer - Chrome Extension for saving pages and highlights
/// Built with Rust + WASM + Yew

mod article;
mod dates;
mod error;
mod github;
mod messages;
mod reconciler;
mod router;
mod selection;
mod storage;
mod transfer;
pub mod ui;

use crate::error::Error;
use crate::github::GlooGitHubClient;
use crate::messages::{Ack, ContentRequest, Request, Response, SavePayload};
use crate::router::Router;
use crate::storage::{ArticleStore, ChromeStorage};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

type BackgroundRouter = Router<ChromeStorage, GlooGitHubClient>;

thread_local! {
    static ROUTER: Rc<BackgroundRouter> =
        Rc::new(Router::new(ArticleStore::new(ChromeStorage), GlooGitHubClient));
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Background entry point for `chrome.runtime.onMessage`; resolves to the
/// single reply for `message`
#[wasm_bindgen]
pub async fn handle_message(message: JsValue) -> Result<JsValue, JsValue> {
    let router = ROUTER.with(Rc::clone);

    let response = match serde_wasm_bindgen::from_value::<serde_json::Value>(message) {
        Ok(value) => router.handle_json(value).await,
        Err(e) => Response::Ack(Ack::failed(&Error::Validation(format!(
            "Unreadable message: {:?}",
            e
        )))),
    };

    to_js(&response)
}

/// Context-menu save of the selected text; resolves to the `SHOW_FEEDBACK`
/// message the background forwards to the tab
#[wasm_bindgen]
pub async fn save_selection_from_menu(title: String, url: String, selection: String) -> Result<JsValue, JsValue> {
    let router = ROUTER.with(Rc::clone);

    let request = Request::SaveArticle(SavePayload {
        title,
        url,
        highlight: Some(selection),
    });
    let ack = match router.handle(request).await {
        Response::Ack(ack) => ack,
        Response::Data(_) => Ack::ok(),
    };

    to_js(&ContentRequest::feedback(&ack))
}

/// Content-script entry point for messages sent to a tab
#[wasm_bindgen]
pub fn handle_content_message(message: JsValue) -> Result<JsValue, JsValue> {
    let reply = match serde_wasm_bindgen::from_value::<ContentRequest>(message) {
        Ok(request) => selection::handle_content_request(request),
        Err(e) => {
            log::warn!("Ignoring content message: {:?}", e);
            serde_json::Value::Null
        }
    };

    to_js(&reply)
}

/// Trimmed text selected on the current page
#[wasm_bindgen]
pub fn selected_text() -> Result<String, JsValue> {
    selection::current_selection().map_err(|e| JsValue::from_str(&e.to_string()))
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}
