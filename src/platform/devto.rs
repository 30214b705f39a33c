use super::{HttpClient, MAX_SEARCH_PAGES, PayloadPreview, PlatformAdapter, PublishOutcome};
use crate::article::Article;
use crate::markup::ZennMarkup;
use crate::status::Platform;
use serde::{Deserialize, Serialize};

pub const DEVTO_API_BASE: &str = "https://dev.to/api";
const ACCEPT: &str = "application/vnd.forem.api-v1+json";
const MAX_TAGS: usize = 4;
const PAGE_SIZE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevtoArticleBody {
    pub title: String,
    pub body_markdown: String,
    pub published: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
}

/// Request envelope: `{"article": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevtoPayload {
    pub article: DevtoArticleBody,
}

#[derive(Debug, Deserialize)]
struct ArticleResponse {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedArticle {
    id: u64,
    #[serde(default)]
    title: String,
}

pub struct DevtoAdapter {
    client: HttpClient,
    api_key: String,
    base_url: String,
    markup: ZennMarkup,
}

impl DevtoAdapter {
    pub fn new(client: HttpClient, api_key: impl Into<String>, markup: ZennMarkup) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEVTO_API_BASE.to_string(),
            markup,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> [(&str, &str); 2] {
        [("api-key", self.api_key.as_str()), ("Accept", ACCEPT)]
    }

    fn send(&self, method: &str, url: &str, payload: &DevtoPayload) -> PublishOutcome {
        match self.client.send_json(method, url, &self.headers(), payload) {
            Ok(response) if response.is_success() => match response.json::<ArticleResponse>() {
                Ok(article) => PublishOutcome::from_url(Platform::Devto, article.url),
                Err(e) => PublishOutcome::failed(Platform::Devto, e),
            },
            Ok(response) => PublishOutcome::failed(Platform::Devto, response.describe()),
            Err(e) => PublishOutcome::failed(Platform::Devto, e),
        }
    }
}

impl PlatformAdapter for DevtoAdapter {
    type Payload = DevtoPayload;

    fn platform(&self) -> Platform {
        Platform::Devto
    }

    fn convert(&self, article: &Article, canonical_url: Option<&str>) -> DevtoPayload {
        DevtoPayload {
            article: DevtoArticleBody {
                title: article.title.clone(),
                body_markdown: self.markup.translate(&article.body),
                published: true,
                tags: article.topics.iter().take(MAX_TAGS).cloned().collect(),
                canonical_url: canonical_url
                    .filter(|url| !url.is_empty())
                    .map(str::to_string),
            },
        }
    }

    fn preview(&self, payload: &DevtoPayload) -> PayloadPreview {
        let article = &payload.article;
        PayloadPreview::new(Platform::Devto, &article.title, &article.body_markdown)
            .tags(&article.tags)
            .canonical(article.canonical_url.as_deref())
    }

    fn create(&self, payload: &DevtoPayload) -> PublishOutcome {
        self.send("POST", &format!("{}/articles", self.base_url), payload)
    }

    fn update(&self, existing_id: &str, payload: &DevtoPayload) -> PublishOutcome {
        self.send(
            "PUT",
            &format!("{}/articles/{existing_id}", self.base_url),
            payload,
        )
    }

    fn find_existing_by_title(&self, title: &str) -> Option<String> {
        let url = format!("{}/articles/me/published", self.base_url);
        for page in 1..=MAX_SEARCH_PAGES {
            let response = self
                .client
                .get(
                    &url,
                    &self.headers(),
                    &[("page", page.to_string()), ("per_page", PAGE_SIZE.to_string())],
                )
                .ok()
                .filter(|response| response.is_success())?;
            let articles: Vec<ListedArticle> = response.json().ok()?;
            if articles.is_empty() {
                return None;
            }
            if let Some(article) = articles.into_iter().find(|article| article.title == title) {
                return Some(article.id.to_string());
            }
        }
        None
    }
}
