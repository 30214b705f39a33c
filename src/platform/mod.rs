//! Secondary platform adapters and the shared create-or-update routine.

pub mod devto;
pub mod hashnode;
pub mod http;
pub mod qiita;

use crate::article::Article;
use crate::credentials::Credentials;
use crate::markup::ZennMarkup;
use crate::status::Platform;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub use devto::DevtoAdapter;
pub use hashnode::HashnodeAdapter;
pub use http::{HttpClient, HttpResponse};
pub use qiita::QiitaAdapter;

/// Maximum length of the error text carried by a failed outcome.
pub const MAX_ERROR_CHARS: usize = 200;

/// Remote listings are scanned at most this many pages deep.
pub const MAX_SEARCH_PAGES: u32 = 5;

/// Dry-run previews show at most this much of the converted body.
pub const PREVIEW_BODY_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub platform: Platform,
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
}

impl PublishOutcome {
    pub fn published(platform: Platform, url: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            url: Some(url.into()),
            error: None,
        }
    }

    pub fn failed(platform: Platform, error: impl AsRef<str>) -> Self {
        Self {
            platform,
            success: false,
            url: None,
            error: Some(truncate_chars(error.as_ref(), MAX_ERROR_CHARS)),
        }
    }

    /// Success only counts when the platform handed back a URL to record.
    pub fn from_url(platform: Platform, url: Option<String>) -> Self {
        match url.filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::published(platform, url),
            None => Self::failed(platform, "response did not include a URL"),
        }
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.url, &self.error) {
            (Some(url), _) if self.success => write!(f, "{} OK: {url}", self.platform),
            (_, Some(error)) => write!(f, "{} FAIL: {error}", self.platform),
            _ => write!(f, "{} FAIL", self.platform),
        }
    }
}

/// What a converted payload would send, for dry-run output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPreview {
    pub platform: Platform,
    /// Labelled header lines, in display order.
    pub fields: Vec<(&'static str, String)>,
    pub body: String,
}

impl PayloadPreview {
    pub fn new(platform: Platform, title: &str, body: &str) -> Self {
        Self {
            platform,
            fields: vec![("Title", title.to_string())],
            body: body.to_string(),
        }
    }

    pub fn field(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    pub fn tags(self, tags: &[String]) -> Self {
        self.field("Tags", format!("[{}]", tags.join(", ")))
    }

    pub fn canonical(self, url: Option<&str>) -> Self {
        self.field("Canonical", url.unwrap_or("(none)"))
    }
}

impl fmt::Display for PayloadPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} payload (dry-run) ---", self.platform)?;
        for (label, value) in &self.fields {
            writeln!(f, "{label}: {value}")?;
        }
        let total = self.body.chars().count();
        writeln!(f, "Body ({total} chars):")?;
        writeln!(f)?;
        writeln!(f, "{}", truncate_chars(&self.body, PREVIEW_BODY_CHARS))?;
        if total > PREVIEW_BODY_CHARS {
            writeln!(f)?;
            writeln!(f, "... ({} chars truncated)", total - PREVIEW_BODY_CHARS)?;
        }
        Ok(())
    }
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Per-platform capability: payload conversion plus the three remote calls.
///
/// Implementations never return errors; every failure becomes a failed
/// [`PublishOutcome`] or, for lookups, `None`.
pub trait PlatformAdapter {
    type Payload: Serialize;

    fn platform(&self) -> Platform;

    fn convert(&self, article: &Article, canonical_url: Option<&str>) -> Self::Payload;

    fn preview(&self, payload: &Self::Payload) -> PayloadPreview;

    fn create(&self, payload: &Self::Payload) -> PublishOutcome;

    fn update(&self, existing_id: &str, payload: &Self::Payload) -> PublishOutcome;

    fn find_existing_by_title(&self, title: &str) -> Option<String>;
}

/// Convert, look for an earlier copy by title, then update it or create a new one.
pub fn upsert<A>(adapter: &A, article: &Article, canonical_url: Option<&str>) -> PublishOutcome
where
    A: PlatformAdapter + ?Sized,
{
    let payload = adapter.convert(article, canonical_url);
    match adapter.find_existing_by_title(&article.title) {
        Some(existing_id) => {
            tracing::info!(
                "  {}: existing article found ({existing_id}), updating",
                adapter.platform()
            );
            adapter.update(&existing_id, &payload)
        }
        None => adapter.create(&payload),
    }
}

/// Object-safe view of an adapter, so adapters with different payload
/// types can sit in one [`PublisherSet`].
pub trait Publisher {
    fn target(&self) -> Platform;

    fn publish(&self, article: &Article, canonical_url: Option<&str>) -> PublishOutcome;
}

impl<A: PlatformAdapter> Publisher for A {
    fn target(&self) -> Platform {
        self.platform()
    }

    fn publish(&self, article: &Article, canonical_url: Option<&str>) -> PublishOutcome {
        upsert(self, article, canonical_url)
    }
}

#[derive(Default)]
pub struct PublisherSet {
    publishers: BTreeMap<Platform, Box<dyn Publisher>>,
}

impl PublisherSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, publisher: Box<dyn Publisher>) {
        self.publishers.insert(publisher.target(), publisher);
    }

    pub fn with(mut self, publisher: impl Publisher + 'static) -> Self {
        self.insert(Box::new(publisher));
        self
    }

    pub fn get(&self, platform: Platform) -> Option<&dyn Publisher> {
        self.publishers.get(&platform).map(|publisher| publisher.as_ref())
    }

    /// Live adapters for every platform whose credentials are present.
    pub fn from_credentials(credentials: &Credentials, settings: &AdapterSettings) -> Self {
        let client = HttpClient::new(settings.timeout);
        let mut set = Self::new();
        if let Some(token) = credentials.qiita_token() {
            set.insert(Box::new(QiitaAdapter::new(
                client.clone(),
                token,
                settings.markup.clone(),
            )));
        }
        if let Some(api_key) = credentials.devto_api_key() {
            set.insert(Box::new(DevtoAdapter::new(
                client.clone(),
                api_key,
                settings.markup.clone(),
            )));
        }
        if let (Some(token), Some(publication_id)) = (
            credentials.hashnode_token(),
            credentials.hashnode_publication_id(),
        ) {
            set.insert(Box::new(HashnodeAdapter::new(
                client,
                token,
                publication_id,
                settings.markup.clone(),
            )));
        }
        set
    }
}

impl fmt::Debug for PublisherSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.publishers.keys()).finish()
    }
}

#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub timeout: Duration,
    pub markup: ZennMarkup,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            timeout: http::DEFAULT_TIMEOUT,
            markup: ZennMarkup::default(),
        }
    }
}
