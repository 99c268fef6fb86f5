/// Text selection on the current page, and the content-script message handler
use crate::error::{Error, Result};
use crate::messages::{Ack, ContentRequest, SelectionReply};
use serde_json::Value;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/content.js")]
extern "C" {
    fn showFeedback(message: &str, is_error: bool);
}

pub fn trimmed_selection(raw: Option<String>) -> Result<String> {
    raw.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(Error::NothingSelected)
}

/// Text the user has selected in this document
pub fn current_selection() -> Result<String> {
    let raw = web_sys::window()
        .and_then(|window| window.get_selection().ok().flatten())
        .map(|selection| String::from(selection.to_string()));

    trimmed_selection(raw)
}

/// Content scripts answer `SAVE_HIGHLIGHT` and display `SHOW_FEEDBACK`
pub fn handle_content_request(request: ContentRequest) -> Value {
    let reply = match request {
        ContentRequest::SaveHighlight => serde_json::to_value(SelectionReply::from(current_selection())),
        ContentRequest::ShowFeedback { success, message } => {
            showFeedback(&message, !success);
            serde_json::to_value(Ack::ok())
        }
    };

    reply.unwrap_or_else(|e| {
        log::error!("Failed to encode content reply: {}", e);
        Value::Null
    })
}
