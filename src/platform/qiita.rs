use super::{HttpClient, MAX_SEARCH_PAGES, PayloadPreview, PlatformAdapter, PublishOutcome};
use crate::article::Article;
use crate::markup::ZennMarkup;
use crate::status::Platform;
use serde::{Deserialize, Serialize};

pub const QIITA_API_BASE: &str = "https://qiita.com/api/v2";
const MAX_TAGS: usize = 5;
const PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QiitaTag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QiitaItem {
    pub title: String,
    pub body: String,
    pub tags: Vec<QiitaTag>,
    pub private: bool,
}

#[derive(Debug, Deserialize)]
struct ItemResponse {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedItem {
    id: String,
    #[serde(default)]
    title: String,
}

pub struct QiitaAdapter {
    client: HttpClient,
    token: String,
    base_url: String,
    markup: ZennMarkup,
}

impl QiitaAdapter {
    pub fn new(client: HttpClient, token: impl Into<String>, markup: ZennMarkup) -> Self {
        Self {
            client,
            token: token.into(),
            base_url: QIITA_API_BASE.to_string(),
            markup,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn send(&self, method: &str, url: &str, payload: &QiitaItem) -> PublishOutcome {
        let auth = self.auth();
        match self
            .client
            .send_json(method, url, &[("Authorization", auth.as_str())], payload)
        {
            Ok(response) if response.is_success() => match response.json::<ItemResponse>() {
                Ok(item) => PublishOutcome::from_url(Platform::Qiita, item.url),
                Err(e) => PublishOutcome::failed(Platform::Qiita, e),
            },
            Ok(response) => PublishOutcome::failed(Platform::Qiita, response.describe()),
            Err(e) => PublishOutcome::failed(Platform::Qiita, e),
        }
    }
}

impl PlatformAdapter for QiitaAdapter {
    type Payload = QiitaItem;

    fn platform(&self) -> Platform {
        Platform::Qiita
    }

    /// Qiita has no canonical URL field; the argument is ignored.
    fn convert(&self, article: &Article, _canonical_url: Option<&str>) -> QiitaItem {
        QiitaItem {
            title: article.title.clone(),
            body: self.markup.translate(&article.body),
            tags: article
                .topics
                .iter()
                .take(MAX_TAGS)
                .map(|name| QiitaTag { name: name.clone() })
                .collect(),
            private: false,
        }
    }

    fn preview(&self, payload: &QiitaItem) -> PayloadPreview {
        let tags: Vec<String> = payload.tags.iter().map(|tag| tag.name.clone()).collect();
        PayloadPreview::new(Platform::Qiita, &payload.title, &payload.body).tags(&tags)
    }

    fn create(&self, payload: &QiitaItem) -> PublishOutcome {
        self.send("POST", &format!("{}/items", self.base_url), payload)
    }

    fn update(&self, existing_id: &str, payload: &QiitaItem) -> PublishOutcome {
        self.send(
            "PATCH",
            &format!("{}/items/{existing_id}", self.base_url),
            payload,
        )
    }

    fn find_existing_by_title(&self, title: &str) -> Option<String> {
        let url = format!("{}/authenticated_user/items", self.base_url);
        let auth = self.auth();
        for page in 1..=MAX_SEARCH_PAGES {
            let response = self
                .client
                .get(
                    &url,
                    &[("Authorization", auth.as_str())],
                    &[("page", page.to_string()), ("per_page", PAGE_SIZE.to_string())],
                )
                .ok()
                .filter(|response| response.is_success())?;
            let items: Vec<ListedItem> = response.json().ok()?;
            if items.is_empty() {
                return None;
            }
            if let Some(item) = items.into_iter().find(|item| item.title == title) {
                return Some(item.id);
            }
        }
        None
    }
}
