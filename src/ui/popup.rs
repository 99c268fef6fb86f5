/// Popup UI for the Article Summarizer extension

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use patternfly_yew::prelude::*;
use chrono::Local;
use serde::{Deserialize, Serialize};
use crate::article::Article;
use crate::error::{Error, Result};
use crate::github::GitHubConfig;
use crate::messages::{ContentRequest, DeletePayload, ImportPayload, Reply, Request, Response, SavePayload, SelectionReply, SyncPayload};
use crate::transfer::{export_filename, export_json, parse_import};
use crate::ui::components::ArticleCard;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendToActiveTab(message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn readSelectedFile(input: &HtmlInputElement) -> std::result::Result<JsValue, JsValue>;

    fn exportToFile(data: &str, filename: &str);

    fn openTab(url: &str);
}

/// Title and URL of the tab the popup was opened over
#[derive(Deserialize)]
struct PageInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Notice(String),
    Error(String),
}

#[derive(Clone, PartialEq)]
enum Pane {
    Articles,
    Transfer,
    GitHub,
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let articles = use_state(Vec::<Article>::new);
    let active_pane = use_state(|| Pane::Articles);
    let token = use_state(String::new);
    let repo = use_state(String::new);
    let path = use_state(String::new);

    // Load articles and GitHub settings on mount
    {
        let articles = articles.clone();
        let state = state.clone();
        let token = token.clone();
        let repo = repo.clone();
        let path = path.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                refresh(articles, state.clone()).await;

                match load_config().await {
                    Ok(Some(config)) => {
                        token.set(config.token);
                        repo.set(config.repo);
                        path.set(config.path);
                    }
                    Ok(None) => {}
                    Err(e) => log::error!("Failed to load GitHub settings: {}", e),
                }
            });
            || ()
        });
    }

    let on_save_page = save_handler(articles.clone(), state.clone(), false);
    let on_save_highlight = save_handler(articles.clone(), state.clone(), true);

    // Delete article handler
    let on_delete = {
        let articles = articles.clone();
        let state = state.clone();

        Callback::from(move |id: String| {
            let articles = articles.clone();
            let state = state.clone();

            spawn_local(async move {
                match send(&Request::DeleteArticle(DeletePayload { id })).await {
                    Ok(_) => refresh(articles, state).await,
                    Err(e) => state.set(AppState::Error(format!("Failed to delete article: {}", e))),
                }
            });
        })
    };

    let on_open = Callback::from(|url: String| openTab(&url));

    // Export handler
    let on_export = {
        let state = state.clone();

        Callback::from(move |_| {
            let state = state.clone();

            spawn_local(async move {
                let exported = load_articles().await.and_then(|articles| {
                    let json = export_json(&articles)?;
                    exportToFile(&json, &export_filename(&Local::now()));
                    Ok(articles.len())
                });

                match exported {
                    Ok(count) => state.set(AppState::Notice(format!("Exported {} articles", count))),
                    Err(e) => state.set(AppState::Error(format!("Export failed: {}", e))),
                }
            });
        })
    };

    // Import handler, fired when a file is picked
    let on_import = {
        let articles = articles.clone();
        let state = state.clone();

        Callback::from(move |e: Event| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let articles = articles.clone();
            let state = state.clone();

            state.set(AppState::Loading("Importing articles...".to_string()));

            spawn_local(async move {
                let result = import_file(&input).await;
                input.set_value("");

                match result {
                    Ok(count) => {
                        refresh(articles, state.clone()).await;
                        state.set(AppState::Notice(format!("Imported file with {} valid articles", count)));
                    }
                    Err(e) => state.set(AppState::Error(format!("Import failed: {}", e))),
                }
            });
        })
    };

    let on_token_input = text_input(token.clone());
    let on_repo_input = text_input(repo.clone());
    let on_path_input = text_input(path.clone());

    // Save GitHub settings handler
    let on_save_config = {
        let state = state.clone();
        let token = token.clone();
        let repo = repo.clone();
        let path = path.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let config = GitHubConfig::new(&token, &repo, &path);

            spawn_local(async move {
                let saved = match config.validate() {
                    Ok(()) => send(&Request::SaveGithubConfig(config)).await.map(|_| ()),
                    Err(e) => Err(e),
                };

                match saved {
                    Ok(()) => state.set(AppState::Notice("GitHub settings saved".to_string())),
                    Err(e) => state.set(AppState::Error(format!("Failed to save settings: {}", e))),
                }
            });
        })
    };

    // Sync handler
    let on_sync = {
        let state = state.clone();
        let token = token.clone();
        let repo = repo.clone();
        let path = path.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let config = GitHubConfig::new(&token, &repo, &path);

            state.set(AppState::Loading("Syncing to GitHub...".to_string()));

            spawn_local(async move {
                match sync(config).await {
                    Ok(count) => state.set(AppState::Notice(format!("Synced {} articles to GitHub", count))),
                    Err(e) => state.set(AppState::Error(format!("Sync failed: {}", e))),
                }
            });
        })
    };

    let is_busy = matches!(*state, AppState::Loading(_));

    // Pane click handlers
    let on_pane_click = {
        let active_pane = active_pane.clone();
        move |pane: Pane| {
            let active_pane = active_pane.clone();
            Callback::from(move |_| {
                active_pane.set(pane.clone());
            })
        }
    };

    let pane_class = |pane: Pane| {
        if *active_pane == pane {
            "pf-v5-c-tabs__item pf-m-current"
        } else {
            "pf-v5-c-tabs__item"
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Article Summarizer"}</h1>

            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    <li class={pane_class(Pane::Articles)}>
                        <button class="pf-v5-c-tabs__link" onclick={on_pane_click(Pane::Articles)}>
                            <span class="pf-v5-c-tabs__item-text">{"Articles"}</span>
                        </button>
                    </li>
                    <li class={pane_class(Pane::Transfer)}>
                        <button class="pf-v5-c-tabs__link" onclick={on_pane_click(Pane::Transfer)}>
                            <span class="pf-v5-c-tabs__item-text">{"Export/Import"}</span>
                        </button>
                    </li>
                    <li class={pane_class(Pane::GitHub)}>
                        <button class="pf-v5-c-tabs__link" onclick={on_pane_click(Pane::GitHub)}>
                            <span class="pf-v5-c-tabs__item-text">{"GitHub"}</span>
                        </button>
                    </li>
                </ul>
            </div>

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Notice(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <div class="tab-pane-content">
                {match &*active_pane {
                    Pane::Articles => html! {
                        <div class="flex-column-gap">
                            <Button onclick={on_save_page} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                                {"Save Current Page"}
                            </Button>
                            <Button onclick={on_save_highlight} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"Save Highlighted Text"}
                            </Button>

                            if articles.is_empty() {
                                <p class="empty-message">{"No saved articles yet"}</p>
                            } else {
                                <div class="article-list">
                                    {for articles.iter().map(|article| html! {
                                        <ArticleCard
                                            key={article.id.clone()}
                                            article={article.clone()}
                                            on_delete={on_delete.clone()}
                                            on_open={on_open.clone()}
                                        />
                                    })}
                                </div>
                            }
                        </div>
                    },
                    Pane::Transfer => html! {
                        <div class="flex-column-gap">
                            <Button onclick={on_export} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"Export Articles"}
                            </Button>
                            <label class="import-label">
                                {"Import from JSON file"}
                                <input type="file" accept="application/json,.json" disabled={is_busy} onchange={on_import} />
                            </label>
                        </div>
                    },
                    Pane::GitHub => html! {
                        <div class="flex-column-gap">
                            <input class="pf-v5-c-form-control" type="password" placeholder="Personal access token"
                                value={(*token).clone()} oninput={on_token_input} />
                            <input class="pf-v5-c-form-control" type="text" placeholder="owner/repository"
                                value={(*repo).clone()} oninput={on_repo_input} />
                            <input class="pf-v5-c-form-control" type="text" placeholder="path/to/articles.json"
                                value={(*path).clone()} oninput={on_path_input} />
                            <Button onclick={on_save_config} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"Save Settings"}
                            </Button>
                            <Button onclick={on_sync} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                                {"Sync to GitHub"}
                            </Button>
                        </div>
                    },
                }}
            </div>

            <p class="footer-popup">
                {"Article Summarizer v0.1.0"}
            </p>
        </div>
    }
}

fn save_handler(
    articles: UseStateHandle<Vec<Article>>,
    state: UseStateHandle<AppState>,
    with_highlight: bool,
) -> Callback<MouseEvent> {
    Callback::from(move |_| {
        let articles = articles.clone();
        let state = state.clone();

        state.set(AppState::Loading("Saving...".to_string()));

        spawn_local(async move {
            match save_current_page(with_highlight).await {
                Ok(()) => {
                    refresh(articles, state.clone()).await;
                    let notice = if with_highlight { "Highlight saved" } else { "Article saved successfully" };
                    state.set(AppState::Notice(notice.to_string()));
                }
                Err(e) => state.set(AppState::Error(format!("Failed to save article: {}", e))),
            }
        });
    })
}

fn text_input(field: UseStateHandle<String>) -> Callback<InputEvent> {
    Callback::from(move |e: InputEvent| {
        if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
            field.set(input.value());
        }
    })
}

// Helper functions

async fn refresh(articles: UseStateHandle<Vec<Article>>, state: UseStateHandle<AppState>) {
    match load_articles().await {
        Ok(loaded) => {
            articles.set(loaded);
            state.set(AppState::Idle);
        }
        Err(e) => state.set(AppState::Error(format!("Failed to load articles: {}", e))),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Error::transport("Failed to serialize message", e))
}

async fn send(request: &Request) -> Result<Option<Reply>> {
    let reply = sendMessage(to_js(request)?)
        .await
        .map_err(|e| Error::transport(request.tag(), e))?;

    let response: Response = serde_wasm_bindgen::from_value(reply)
        .map_err(|e| Error::transport("Unexpected reply", e))?;

    response.into_result()
}

async fn load_articles() -> Result<Vec<Article>> {
    match send(&Request::GetArticles).await? {
        Some(Reply::GetArticlesResponse(articles)) => Ok(articles),
        _ => Err(Error::Transport("Unexpected reply to GET_ARTICLES".to_string())),
    }
}

async fn load_config() -> Result<Option<GitHubConfig>> {
    match send(&Request::GetGithubConfig).await? {
        Some(Reply::GetGithubConfigResponse(config)) => Ok(config),
        _ => Err(Error::Transport("Unexpected reply to GET_GITHUB_CONFIG".to_string())),
    }
}

async fn save_current_page(with_highlight: bool) -> Result<()> {
    let page: PageInfo = serde_wasm_bindgen::from_value(
        getActiveTab()
            .await
            .map_err(|e| Error::transport("Failed to get active tab", e))?,
    )
    .map_err(|e| Error::transport("Failed to parse tab", e))?;

    let highlight = if with_highlight {
        let reply = sendToActiveTab(to_js(&ContentRequest::SaveHighlight)?)
            .await
            .map_err(|e| Error::transport("Failed to reach the page", e))?;
        let reply: SelectionReply = serde_wasm_bindgen::from_value(reply)
            .map_err(|e| Error::transport("Unexpected reply from the page", e))?;

        if !reply.success {
            return Err(Error::NothingSelected);
        }
        reply.highlight
    } else {
        None
    };

    let payload = SavePayload {
        title: page.title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Untitled Page".to_string()),
        url: page.url.unwrap_or_default(),
        highlight,
    };
    send(&Request::SaveArticle(payload)).await?;
    Ok(())
}

async fn import_file(input: &HtmlInputElement) -> Result<usize> {
    let text = readSelectedFile(input)
        .await
        .map_err(|e| Error::Validation(format!("Could not read file: {:?}", e)))?
        .as_string()
        .ok_or_else(|| Error::Validation("No file selected".to_string()))?;

    let articles = parse_import(&text)?
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let count = articles.len();
    send(&Request::ImportArticles(ImportPayload { articles })).await?;
    Ok(count)
}

async fn sync(config: GitHubConfig) -> Result<usize> {
    config.validate()?;
    let articles = load_articles().await?;
    let count = articles.len();
    send(&Request::SyncToGithub(SyncPayload { articles, config })).await?;
    Ok(count)
}
