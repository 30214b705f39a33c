//! One-off cross-post of a single article, outside the schedule.

use crate::article::{Article, ArticleError};
use crate::credentials::CredentialError;
use crate::platform::PlatformAdapter;
use crate::status::Platform;
use std::convert::Infallible;
use std::fmt;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tracing::info;

pub const SOURCE_DIR: &str = "articles";
pub const ENGLISH_DIR: &str = "articles-en";

/// Which remote article `--update` rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    /// Look the article up by title first.
    Auto,
    Id(String),
}

impl FromStr for UpdateTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "auto" => UpdateTarget::Auto,
            id => UpdateTarget::Id(id.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualRequest {
    /// Article path relative to the repository root.
    pub article: String,
    pub platform: Platform,
    pub update: Option<UpdateTarget>,
    pub canonical_url: Option<String>,
    pub dry_run: bool,
    /// Skip the English translation check.
    pub force: bool,
}

impl ManualRequest {
    pub fn new(article: impl Into<String>, platform: Platform) -> Self {
        Self {
            article: article.into(),
            platform,
            update: None,
            canonical_url: None,
            dry_run: false,
            force: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManualError {
    #[error(transparent)]
    Article(#[from] ArticleError),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("{}", translation_hint(.platform, .english, .exists))]
    NeedsTranslation {
        platform: Platform,
        english: PathBuf,
        exists: bool,
    },
    #[error("invalid {platform} article id: {id}")]
    InvalidId { platform: Platform, id: String },
    #[error("article not found on {0}")]
    NotFoundRemotely(Platform),
    #[error("{0}")]
    Failed(String),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn translation_hint(platform: &Platform, english: &Path, exists: &bool) -> String {
    if *exists {
        format!(
            "English version exists at {}; use it for {platform}, or pass --force to skip this check",
            english.display()
        )
    } else {
        format!(
            "no English translation found at {}; translate the article first, or pass --force to publish in Japanese",
            english.display()
        )
    }
}

/// The `articles-en/` counterpart of a file under `articles/`, if the guard applies.
pub fn english_counterpart(file: &str) -> Option<PathBuf> {
    let path = Path::new(file);
    let mut in_source_dir = false;
    for component in path.components() {
        if let Component::Normal(name) = component {
            if name == ENGLISH_DIR {
                return None;
            }
            if name == SOURCE_DIR {
                in_source_dir = true;
            }
        }
    }
    if !in_source_dir {
        return None;
    }
    let name = path.file_name()?;
    let base = path.parent()?.parent().unwrap_or_else(|| Path::new(""));
    Some(base.join(ENGLISH_DIR).join(name))
}

/// Japanese sources may not go to the English-language platforms unless forced.
pub fn check_translation(repo_root: &Path, request: &ManualRequest) -> Result<(), ManualError> {
    if request.force || request.platform == Platform::Qiita {
        return Ok(());
    }
    let Some(english) = english_counterpart(&request.article) else {
        return Ok(());
    };
    Err(ManualError::NeedsTranslation {
        platform: request.platform,
        exists: repo_root.join(&english).is_file(),
        english,
    })
}

/// What a manual publish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualOutcome {
    Previewed,
    Published(String),
    Updated(String),
}

impl fmt::Display for ManualOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManualOutcome::Previewed => f.write_str("dry-run, nothing sent"),
            ManualOutcome::Published(url) => write!(f, "Published: {url}"),
            ManualOutcome::Updated(url) => write!(f, "Updated: {url}"),
        }
    }
}

/// Convert `article` for `adapter`, then preview, create or update it.
pub fn publish_article<A, W>(
    adapter: &A,
    article: &Article,
    request: &ManualRequest,
    out: &mut W,
) -> Result<ManualOutcome, ManualError>
where
    A: PlatformAdapter + ?Sized,
    W: Write + ?Sized,
{
    let platform = adapter.platform();
    let payload = adapter.convert(article, request.canonical_url.as_deref());
    if request.dry_run {
        write!(out, "{}", adapter.preview(&payload))?;
        return Ok(ManualOutcome::Previewed);
    }

    let outcome = match &request.update {
        None => adapter.create(&payload),
        Some(target) => {
            let id = match target {
                UpdateTarget::Id(id) => id.clone(),
                UpdateTarget::Auto => {
                    info!("Searching for existing article: {}", article.title);
                    let id = adapter
                        .find_existing_by_title(&article.title)
                        .ok_or(ManualError::NotFoundRemotely(platform))?;
                    info!("Found: {id}");
                    id
                }
            };
            if platform == Platform::Devto && !is_numeric_id(&id) {
                return Err(ManualError::InvalidId { platform, id });
            }
            adapter.update(&id, &payload)
        }
    };

    match (outcome.success, outcome.url) {
        (true, Some(url)) => {
            let outcome = if request.update.is_some() {
                ManualOutcome::Updated(url)
            } else {
                ManualOutcome::Published(url)
            };
            writeln!(out, "{outcome} ({platform})")?;
            Ok(outcome)
        }
        _ => Err(ManualError::Failed(format!(
            "{platform} FAIL: {}",
            outcome.error.unwrap_or_default()
        ))),
    }
}

fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}
