//! Flags shared by the binaries.

use crate::config::PublisherConfig;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Repository root containing the articles and the scripts directory.
    #[arg(long, env = "PUBLISH_REPO_ROOT", default_value = ".")]
    pub repo_root: PathBuf,

    /// Schedule document (default: <repo-root>/scripts/schedule.json).
    #[arg(long, env = "PUBLISH_SCHEDULE_PATH")]
    pub schedule: Option<PathBuf>,

    /// Append log lines to this file instead of the default one.
    #[arg(long, conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Log to stderr only.
    #[arg(long)]
    pub no_log_file: bool,

    /// Reference date used instead of the local date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Base URL that `/images/...` links are rewritten to.
    #[arg(long, env = "PUBLISH_IMAGE_BASE_URL")]
    pub image_base_url: Option<String>,

    /// Per-request timeout for platform APIs, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl CommonArgs {
    /// Resolved configuration; `default_log` names the log file under `scripts/`.
    pub fn config(&self, default_log: &str) -> PublisherConfig {
        let mut config = PublisherConfig::for_repo(&self.repo_root).with_log_name(default_log);
        if let Some(schedule) = &self.schedule {
            config = config.with_schedule_path(schedule);
        }
        if self.no_log_file {
            config = config.with_log_path(None);
        } else if let Some(log_file) = &self.log_file {
            config = config.with_log_path(Some(log_file.clone()));
        }
        if let Some(url) = &self.image_base_url {
            config.image_base_url = url.clone();
        }
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}
