/// Reusable UI components

use yew::prelude::*;
use url::Url;
use crate::article::Article;

/// Host shown under an article title, without a leading `www.`
pub fn site_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}

#[derive(Properties, PartialEq)]
pub struct ArticleCardProps {
    pub article: Article,
    pub on_delete: Callback<String>,
    pub on_open: Callback<String>,
}

#[function_component(ArticleCard)]
pub fn article_card(props: &ArticleCardProps) -> Html {
    let article = &props.article;

    let on_open = {
        let on_open = props.on_open.clone();
        let url = article.url.clone();
        Callback::from(move |_: MouseEvent| on_open.emit(url.clone()))
    };

    let on_delete = {
        let on_delete = props.on_delete.clone();
        let id = article.id.clone();
        Callback::from(move |e: MouseEvent| {
            // Keep the click from opening the article
            e.stop_propagation();
            on_delete.emit(id.clone());
        })
    };

    html! {
        <div class="article-item" onclick={on_open} title={article.url.clone()}>
            <div class="article-title">{&article.title}</div>
            <div class="article-url">{site_label(&article.url)}</div>
            <div class="article-date">{&article.date}</div>
            if !article.highlights.is_empty() {
                <ul class="article-highlights">
                    {for article.highlights.iter().map(|highlight| html! {
                        <li class="article-highlight">{highlight}</li>
                    })}
                </ul>
            }
            <div class="article-actions">
                <button class="delete-btn" title="Delete article" onclick={on_delete}>
                    {"\u{00d7}"}
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_label() {
        assert_eq!(site_label("https://www.bbc.co.uk/news/article"), "bbc.co.uk");
        assert_eq!(site_label("https://docs.rs/serde"), "docs.rs");
        assert_eq!(site_label("http://localhost:3000/page"), "localhost");
    }

    #[test]
    fn test_site_label_falls_back_to_raw_url() {
        assert_eq!(site_label("not a url"), "not a url");
        assert_eq!(site_label("about:blank"), "about:blank");
    }
}
