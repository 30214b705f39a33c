//! The cross-post run: walk the schedule in order, publish what is due,
//! checkpoint after every changed entry.

use crate::article::{Article, ArticleError, load_article, resolve_article_path};
use crate::entry::{Entry, EntryPatch};
use crate::evaluator::{
    DependencyCheck, dependency_satisfied, is_due_on, is_entry_done, pending_platforms,
};
use crate::persistence::{PersistenceError, ScheduleStore};
use crate::platform::PublisherSet;
use crate::schedule::ScheduleDocument;
use crate::status::Platform;
use chrono::NaiveDate;
use std::fmt;
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Execute,
    DryRun,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { RunMode::DryRun } else { RunMode::Execute }
    }

    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No entry was processed or skipped.
    NothingDue,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: RunMode,
    pub processed: usize,
    pub posted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub outcome: RunOutcome,
}

impl RunReport {
    fn new(mode: RunMode) -> Self {
        Self {
            mode,
            processed: 0,
            posted: 0,
            skipped: 0,
            errors: 0,
            outcome: RunOutcome::NothingDue,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 { 1 } else { 0 }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.outcome, self.mode) {
            (RunOutcome::NothingDue, _) => f.write_str("Nothing due today."),
            (RunOutcome::Completed, RunMode::Execute) => write!(
                f,
                "Schedule updated. {} article(s) processed, {} skipped (dependencies), {} error(s).",
                self.processed, self.skipped, self.errors
            ),
            (RunOutcome::Completed, RunMode::DryRun) => write!(
                f,
                "[DRY-RUN] {} article(s) would be posted, {} skipped (dependencies), {} error(s).",
                self.processed, self.skipped, self.errors
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to checkpoint schedule after {file}: {source}")]
    Checkpoint {
        file: String,
        #[source]
        source: PersistenceError,
    },
}

/// One cross-post pass over a schedule document.
pub struct CrossPoster<'a, S: ScheduleStore + ?Sized> {
    store: &'a S,
    publishers: &'a PublisherSet,
    repo_root: &'a Path,
    today: NaiveDate,
    mode: RunMode,
}

impl<'a, S: ScheduleStore + ?Sized> CrossPoster<'a, S> {
    pub fn new(
        store: &'a S,
        publishers: &'a PublisherSet,
        repo_root: &'a Path,
        today: NaiveDate,
    ) -> Self {
        Self {
            store,
            publishers,
            repo_root,
            today,
            mode: RunMode::Execute,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Process every due entry of `document` in order.
    ///
    /// In execute mode the document is saved through the store right after
    /// each entry that gained a URL; a failed save stops the run.
    ///
    /// Dependencies are judged against the document as loaded, so an entry
    /// whose dependency is posted during this run waits for the next one.
    pub fn run(&self, document: &mut ScheduleDocument) -> Result<RunReport, RunError> {
        let mut report = RunReport::new(self.mode);
        let loaded = document.articles.clone();

        for (index, entry) in loaded.iter().enumerate() {
            if !is_due_on(entry, self.today) || is_entry_done(entry) {
                continue;
            }

            match dependency_satisfied(entry, &loaded) {
                DependencyCheck::Satisfied => {}
                DependencyCheck::Unresolved { depends_on } => {
                    warn!(
                        "Dependency {depends_on} not found in schedule for {}",
                        entry.file
                    );
                }
                waiting @ DependencyCheck::Waiting { .. } => {
                    info!(
                        "Skipping {}: {}",
                        entry.file,
                        waiting.reason().unwrap_or_default()
                    );
                    report.skipped += 1;
                    continue;
                }
            }

            report.processed += 1;
            let (patch, errors) = self.process_entry(entry);
            report.errors += errors;

            if self.mode.is_dry_run() || patch.is_empty() {
                continue;
            }
            let updated = match patch.apply(entry) {
                Ok(updated) => updated,
                Err(e) => {
                    error!("Refusing to update {}: {e}", entry.file);
                    report.errors += 1;
                    continue;
                }
            };
            document.articles[index] = updated;
            if let Err(source) = self.store.save_schedule(document) {
                log_unsaved(&document.articles[index]);
                return Err(RunError::Checkpoint {
                    file: entry.file.clone(),
                    source,
                });
            }
            report.posted += patch.posted_count();
        }

        if report.processed > 0 || report.skipped > 0 {
            report.outcome = RunOutcome::Completed;
        }
        info!("{report}");
        Ok(report)
    }

    /// Publish the pending platforms of one entry.
    ///
    /// Returns the URLs gathered as a patch plus the number of errors.
    fn process_entry(&self, entry: &Entry) -> (EntryPatch, usize) {
        let mut patch = EntryPatch::new();

        let path = match resolve_article_path(self.repo_root, &entry.file) {
            Ok(path) => path,
            Err(ArticleError::NotFound(file)) => {
                warn!("File not found: {file}");
                return (patch, 1);
            }
            Err(e) => {
                error!("{e}");
                return (patch, 1);
            }
        };
        let article = match load_article(&path) {
            Ok(article) => article,
            Err(e) => {
                error!("{e}");
                return (patch, 1);
            }
        };

        info!("Processing: {} (date={})", article.title, entry.date);
        let mut errors = 0;
        for platform in pending_platforms(entry) {
            if self.mode.is_dry_run() {
                info!("  [DRY-RUN] Would publish to {platform}: {}", article.title);
                continue;
            }
            match self.publish_one(platform, entry, &article) {
                Some(url) => patch.record_posted(platform, url),
                None => errors += 1,
            }
        }
        (patch, errors)
    }

    fn publish_one(
        &self,
        platform: Platform,
        entry: &Entry,
        article: &Article,
    ) -> Option<String> {
        let Some(publisher) = self.publishers.get(platform) else {
            warn!("  {platform} FAIL: no publisher configured");
            return None;
        };
        let outcome = publisher.publish(article, entry.canonical_url.as_deref());
        if outcome.success {
            info!("  {outcome}");
            outcome.url
        } else {
            warn!("  {outcome}");
            None
        }
    }
}

fn log_unsaved(entry: &Entry) {
    for (platform, status) in entry.platforms() {
        if let Some(url) = status.url() {
            error!(
                "Unsaved result for {}: {} = {url}",
                entry.file,
                platform.key()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: RunOutcome, mode: RunMode, errors: usize) -> RunReport {
        RunReport {
            mode,
            processed: 2,
            posted: 3,
            skipped: 1,
            errors,
            outcome,
        }
    }

    #[test]
    fn summary_lines() {
        assert_eq!(
            report(RunOutcome::Completed, RunMode::Execute, 0).to_string(),
            "Schedule updated. 2 article(s) processed, 1 skipped (dependencies), 0 error(s)."
        );
        assert_eq!(
            report(RunOutcome::NothingDue, RunMode::DryRun, 0).to_string(),
            "Nothing due today."
        );
        assert!(
            report(RunOutcome::Completed, RunMode::DryRun, 0)
                .to_string()
                .starts_with("[DRY-RUN] 2 article(s) would be posted")
        );
    }

    #[test]
    fn exit_code_follows_errors() {
        assert_eq!(report(RunOutcome::Completed, RunMode::Execute, 0).exit_code(), 0);
        assert_eq!(report(RunOutcome::Completed, RunMode::Execute, 2).exit_code(), 1);
    }
}
