//! Primary (Zenn) publishing: flip `published: false` in the article front
//! matter once `zenn_date` arrives, push it, and record `zenn_published`.

use crate::article::{ArticleError, resolve_article_path};
use crate::entry::{Entry, EntryPatch, PatchError};
use crate::git::VersionControl;
use crate::orchestrator::RunMode;
use crate::persistence::{PersistenceError, ScheduleStore};
use crate::schedule::ScheduleDocument;
use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{error, info, warn};

static PUBLISHED_FLAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^published:\s*(true|false)").expect("valid published regex")
});

static UNPUBLISHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(published:\s*)false").expect("valid unpublished regex"));

/// Value of the first `published:` line, if any.
pub fn published_flag(content: &str) -> Option<bool> {
    PUBLISHED_FLAG_RE
        .captures(content)
        .map(|caps| &caps[1] == "true")
}

/// `content` with its first `published: false` turned into `published: true`.
pub fn set_published(content: &str) -> Option<String> {
    if !UNPUBLISHED_RE.is_match(content) {
        return None;
    }
    Some(UNPUBLISHED_RE.replacen(content, 1, "${1}true").into_owned())
}

pub fn commit_message(today: NaiveDate) -> String {
    format!("feat: Zenn 自動公開 ({today})")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryReport {
    pub mode: RunMode,
    pub published: usize,
    pub synced: usize,
    pub errors: usize,
}

impl PrimaryReport {
    pub fn is_nothing_due(&self) -> bool {
        self.published == 0 && self.synced == 0 && self.errors == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 { 1 } else { 0 }
    }
}

impl fmt::Display for PrimaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing_due() {
            return f.write_str("Nothing due today.");
        }
        if self.mode.is_dry_run() {
            f.write_str("[DRY-RUN] ")?;
        }
        write!(
            f,
            "{} article(s) published, {} tracking flag(s) synced, {} error(s).",
            self.published, self.synced, self.errors
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PrimaryError {
    #[error("failed to checkpoint schedule after {file}: {source}")]
    Checkpoint {
        file: String,
        #[source]
        source: PersistenceError,
    },
    #[error(transparent)]
    Patch(#[from] PatchError),
}

enum Step {
    Skip,
    Published,
    Synced,
    Failed,
}

pub struct ZennPublisher<'a, S: ScheduleStore + ?Sized, V: VersionControl + ?Sized> {
    store: &'a S,
    vcs: &'a V,
    repo_root: &'a Path,
    today: NaiveDate,
    mode: RunMode,
}

impl<'a, S, V> ZennPublisher<'a, S, V>
where
    S: ScheduleStore + ?Sized,
    V: VersionControl + ?Sized,
{
    pub fn new(store: &'a S, vcs: &'a V, repo_root: &'a Path, today: NaiveDate) -> Self {
        Self {
            store,
            vcs,
            repo_root,
            today,
            mode: RunMode::Execute,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn run(&self, document: &mut ScheduleDocument) -> Result<PrimaryReport, PrimaryError> {
        let mut report = PrimaryReport {
            mode: self.mode,
            published: 0,
            synced: 0,
            errors: 0,
        };

        for index in 0..document.articles.len() {
            let entry = document.articles[index].clone();
            match self.publish_entry(&entry) {
                Step::Skip => continue,
                Step::Failed => {
                    report.errors += 1;
                    continue;
                }
                Step::Published => report.published += 1,
                Step::Synced => report.synced += 1,
            }
            if self.mode.is_dry_run() {
                continue;
            }
            document.articles[index] = EntryPatch::new().zenn_published().apply(&entry)?;
            self.store
                .save_schedule(document)
                .map_err(|source| PrimaryError::Checkpoint {
                    file: entry.file.clone(),
                    source,
                })?;
        }

        info!("{report}");
        Ok(report)
    }

    fn publish_entry(&self, entry: &Entry) -> Step {
        let Some(zenn_date) = entry.zenn_date() else {
            return Step::Skip;
        };
        if entry.is_zenn_published() || zenn_date > self.today {
            return Step::Skip;
        }

        let path = match resolve_article_path(self.repo_root, &entry.file) {
            Ok(path) => path,
            Err(ArticleError::NotFound(file)) => {
                warn!("File not found: {file}");
                return Step::Failed;
            }
            Err(e) => {
                error!("{e}");
                return Step::Failed;
            }
        };
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to read {}: {e}", entry.file);
                return Step::Failed;
            }
        };

        if published_flag(&content) == Some(true) {
            info!("Already published (marking tracked): {}", entry.file);
            return Step::Synced;
        }

        info!("Publishing: {} (zenn_date={zenn_date})", entry.file);
        let Some(updated) = set_published(&content) else {
            warn!("Could not set published: true in {}", entry.file);
            return Step::Failed;
        };
        if self.mode.is_dry_run() {
            info!("  [DRY-RUN] Would commit 1 file(s) and push.");
            return Step::Published;
        }

        if let Err(e) = fs::write(&path, updated) {
            error!("Failed to write {}: {e}", entry.file);
            return Step::Failed;
        }
        match self
            .vcs
            .commit_and_push(&[entry.file.as_str()], &commit_message(self.today))
        {
            Ok(()) => {
                info!("  git push OK");
                Step::Published
            }
            Err(e) => {
                error!("Git error: {e}");
                match fs::write(&path, &content) {
                    Ok(()) => warn!("Reverted {} to published: false", entry.file),
                    Err(e) => error!(
                        "Failed to revert {}: {e}; it is left with published: true",
                        entry.file
                    ),
                }
                Step::Failed
            }
        }
    }
}
