//! Source documents: locating them under the repository root and reading
//! their YAML front matter.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArticleError {
    #[error("path traversal detected: {0}")]
    Traversal(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid front matter in {}: {source}", .path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("article has no title: {}", .0.display())]
    MissingTitle(PathBuf),
}

pub type ArticleResult<T> = Result<T, ArticleError>;

/// A parsed article ready for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub body: String,
    pub topics: Vec<String>,
    pub emoji: String,
    pub article_type: String,
    pub published: Option<bool>,
}

impl Article {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            topics: Vec::new(),
            emoji: String::new(),
            article_type: "tech".to_string(),
            published: None,
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default, rename = "type")]
    article_type: Option<String>,
    #[serde(default)]
    published: Option<bool>,
}

/// Resolve `file` against `repo_root`, refusing anything that lands outside it.
///
/// `..` segments are checked lexically before touching the filesystem, then
/// the existing file is canonicalized so symlinks cannot escape either.
pub fn resolve_article_path(repo_root: &Path, file: &str) -> ArticleResult<PathBuf> {
    let mut depth: usize = 0;
    for component in Path::new(file).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ArticleError::Traversal(file.to_string()))?;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ArticleError::Traversal(file.to_string()));
            }
        }
    }

    let joined = repo_root.join(file);
    if !joined.is_file() {
        return Err(ArticleError::NotFound(file.to_string()));
    }

    let canonical_root = repo_root.canonicalize().map_err(|source| ArticleError::Io {
        path: repo_root.to_path_buf(),
        source,
    })?;
    let canonical = joined.canonicalize().map_err(|source| ArticleError::Io {
        path: joined.clone(),
        source,
    })?;
    if !canonical.starts_with(&canonical_root) {
        return Err(ArticleError::Traversal(file.to_string()));
    }
    Ok(canonical)
}

/// Split `---` delimited front matter from the body.
///
/// Returns `("", content)` when the document has no front matter block.
pub fn split_front_matter(content: &str) -> (&str, &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return ("", content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let body = &rest[offset + line.len()..];
            return (&rest[..offset], body.trim_start_matches(['\r', '\n']));
        }
        offset += line.len();
    }
    ("", content)
}

pub fn parse_article(content: &str, path: &Path) -> ArticleResult<Article> {
    let (yaml, body) = split_front_matter(content);
    let front: FrontMatter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|source| ArticleError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?
    };

    let title = front.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(ArticleError::MissingTitle(path.to_path_buf()));
    }

    Ok(Article {
        title,
        body: body.to_string(),
        topics: front.topics,
        emoji: front.emoji.unwrap_or_default(),
        article_type: front.article_type.unwrap_or_else(|| "tech".to_string()),
        published: front.published,
    })
}

pub fn load_article(path: &Path) -> ArticleResult<Article> {
    let content = fs::read_to_string(path).map_err(|source| ArticleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_article(&content, path)
}
