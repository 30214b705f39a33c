//! Runnable entry points shared by the binaries.
//!
//! Each function loads what it needs from a [`PublisherConfig`], does one job,
//! and returns a report; the binaries turn reports and errors into exit codes.

use crate::article::{load_article, resolve_article_path};
use crate::config::PublisherConfig;
use crate::credentials::{CredentialError, Credentials};
use crate::evaluator::due_platforms;
use crate::git::VersionControl;
use crate::manual::{ManualError, ManualOutcome, ManualRequest, check_translation, publish_article};
use crate::orchestrator::{CrossPoster, RunError, RunMode, RunReport};
use crate::persistence::{JsonScheduleStore, PersistenceError, ScheduleStore, save_schedule_to_json};
use crate::planner::{
    MergeSummary, PlanError, PlanOptions, generate_schedule, load_or_default, load_scores,
    merge_into_schedule,
};
use crate::platform::{DevtoAdapter, HashnodeAdapter, HttpClient, PublisherSet, QiitaAdapter};
use crate::primary::{PrimaryError, PrimaryReport, ZennPublisher};
use crate::report::{
    ReportFormat, diagnostics_lines, primary_status_rows, render_plan_table,
    render_primary_table, render_status_table, status_rows, write_status_csv,
};
use crate::status::Platform;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Primary(#[from] PrimaryError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Manual(#[from] ManualError),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode entries: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Process exit status for a runnable's result; errors are logged here.
pub fn finish(result: AppResult<i32>) -> ExitCode {
    match result {
        Ok(0) => ExitCode::SUCCESS,
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Cross-post everything due on `today`.
///
/// Credentials are only required for platforms with due work, and not at
/// all in dry-run mode.
pub fn run_crosspost(config: &PublisherConfig, mode: RunMode, today: NaiveDate) -> AppResult<RunReport> {
    let store = JsonScheduleStore::new(&config.schedule_path);
    let mut document = store.load_schedule()?;

    let publishers = if mode.is_dry_run() {
        PublisherSet::new()
    } else {
        let credentials = Credentials::from_env(Some(&config.env_file));
        credentials.require(&due_platforms(&document, today))?;
        PublisherSet::from_credentials(&credentials, &config.adapter_settings())
    };

    let report = CrossPoster::new(&store, &publishers, &config.repo_root, today)
        .with_mode(mode)
        .run(&mut document)?;
    Ok(report)
}

pub fn write_status(
    config: &PublisherConfig,
    today: NaiveDate,
    format: ReportFormat,
    out: &mut dyn Write,
) -> AppResult<()> {
    let document = JsonScheduleStore::new(&config.schedule_path).load_schedule()?;
    let rows = status_rows(&document, today);
    match format {
        ReportFormat::Table => {
            writeln!(out, "Today: {today}")?;
            out.write_all(render_status_table(&rows).as_bytes())?;
        }
        ReportFormat::Csv => write_status_csv(&rows, &mut *out)?,
    }
    for line in diagnostics_lines(&document) {
        warn!("{line}");
    }
    Ok(())
}

/// Outcome of the primary publisher followed by the cross-post pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryRunSummary {
    pub primary: PrimaryReport,
    /// `None` when the cross-post pass failed outright.
    pub crosspost: Option<RunReport>,
}

impl PrimaryRunSummary {
    pub fn exit_code(&self) -> i32 {
        let crosspost_failed = self
            .crosspost
            .as_ref()
            .is_none_or(|report| report.exit_code() != 0);
        if self.primary.exit_code() != 0 || crosspost_failed {
            1
        } else {
            0
        }
    }
}

/// Publish due primary articles, then cross-post from the reloaded schedule.
pub fn run_primary(
    config: &PublisherConfig,
    vcs: &dyn VersionControl,
    mode: RunMode,
    today: NaiveDate,
) -> AppResult<PrimaryRunSummary> {
    let store = JsonScheduleStore::new(&config.schedule_path);
    let mut document = store.load_schedule()?;
    let primary = ZennPublisher::new(&store, vcs, &config.repo_root, today)
        .with_mode(mode)
        .run(&mut document)?;

    info!("=== Cross-post ===");
    let crosspost = match run_crosspost(config, mode, today) {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Cross-post failed: {e}");
            None
        }
    };
    Ok(PrimaryRunSummary { primary, crosspost })
}

pub fn write_primary_status(config: &PublisherConfig, today: NaiveDate, out: &mut dyn Write) -> AppResult<()> {
    let document = JsonScheduleStore::new(&config.schedule_path).load_schedule()?;
    let rows = primary_status_rows(&document, &config.repo_root, today);
    writeln!(out, "Today: {today}")?;
    out.write_all(render_primary_table(&rows).as_bytes())?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Slugs(Vec<String>),
    Scores(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub source: PlanSource,
    pub options: PlanOptions,
    pub merge: bool,
    pub dry_run: bool,
}

/// Generate entries and either print them as JSON or merge them into the schedule.
///
/// Returns the merge summary when a merge was written.
pub fn run_plan(
    config: &PublisherConfig,
    request: &PlanRequest,
    out: &mut dyn Write,
) -> AppResult<Option<MergeSummary>> {
    let (slugs, scores) = match &request.source {
        PlanSource::Slugs(slugs) => (slugs.clone(), None),
        PlanSource::Scores(path) => {
            let (slugs, scores) = load_scores(path)?;
            (slugs, Some(scores))
        }
    };
    let entries = generate_schedule(&slugs, &request.options, scores.as_ref())?;
    out.write_all(render_plan_table(&entries).as_bytes())?;

    if !request.merge {
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(None);
    }
    if request.dry_run {
        info!("[DRY-RUN] Would merge into {}", config.schedule_path.display());
        return Ok(None);
    }

    let mut document = load_or_default(&config.schedule_path)?;
    let summary = merge_into_schedule(&mut document, entries);
    for file in &summary.already_present {
        info!("  Skip (already exists): {file}");
    }
    save_schedule_to_json(&document, &config.schedule_path)?;
    info!(
        "Added {} entries to schedule. Written to {}",
        summary.added,
        config.schedule_path.display()
    );
    Ok(Some(summary))
}

/// Cross-post one article outside the schedule.
///
/// The platform's credentials are only required when something is sent.
pub fn run_manual_publish(
    config: &PublisherConfig,
    request: &ManualRequest,
    out: &mut dyn Write,
) -> AppResult<ManualOutcome> {
    let path = resolve_article_path(&config.repo_root, &request.article).map_err(ManualError::from)?;
    check_translation(&config.repo_root, request)?;
    let article = load_article(&path).map_err(ManualError::from)?;
    info!("Parsed: {} ({} topics)", article.title, article.topics.len());

    let credentials = Credentials::from_env(Some(&config.env_file));
    if !request.dry_run {
        credentials.require(&BTreeSet::from([request.platform]))?;
    }
    let settings = config.adapter_settings();
    let client = HttpClient::new(settings.timeout);
    let outcome = match request.platform {
        Platform::Qiita => {
            let token = credentials.qiita_token().unwrap_or_default();
            let adapter = QiitaAdapter::new(client, token, settings.markup);
            publish_article(&adapter, &article, request, out)
        }
        Platform::Devto => {
            let api_key = credentials.devto_api_key().unwrap_or_default();
            let adapter = DevtoAdapter::new(client, api_key, settings.markup);
            publish_article(&adapter, &article, request, out)
        }
        Platform::Hashnode => {
            let token = credentials.hashnode_token().unwrap_or_default();
            let publication_id = credentials.hashnode_publication_id().unwrap_or("(unset)");
            let adapter = HashnodeAdapter::new(client, token, publication_id, settings.markup);
            publish_article(&adapter, &article, request, out)
        }
    }?;
    Ok(outcome)
}
