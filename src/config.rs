use crate::git::{DEFAULT_BRANCH, DEFAULT_REMOTE};
use crate::markup::{DEFAULT_IMAGE_BASE_URL, ZennMarkup};
use crate::planner::ZENN_BASE_URL;
use crate::platform::AdapterSettings;
use crate::platform::http::DEFAULT_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

pub const SCRIPTS_DIR: &str = "scripts";
pub const SCHEDULE_FILE: &str = "schedule.json";
pub const ENV_FILE: &str = ".env";
pub const PUBLISH_LOG: &str = "publish.log";
pub const ZENN_PUBLISH_LOG: &str = "zenn_publish.log";

/// Everything a run needs to know about where things live.
///
/// Defaults are laid out under `<repo_root>/scripts/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub repo_root: PathBuf,
    pub schedule_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub env_file: PathBuf,
    pub image_base_url: String,
    pub zenn_base_url: String,
    pub request_timeout: Duration,
    pub git_remote: String,
    pub git_branch: String,
}

impl PublisherConfig {
    pub fn for_repo(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        let scripts = repo_root.join(SCRIPTS_DIR);
        Self {
            schedule_path: scripts.join(SCHEDULE_FILE),
            log_path: Some(scripts.join(PUBLISH_LOG)),
            env_file: scripts.join(ENV_FILE),
            repo_root,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            zenn_base_url: ZENN_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            git_remote: DEFAULT_REMOTE.to_string(),
            git_branch: DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.repo_root.join(SCRIPTS_DIR)
    }

    pub fn with_schedule_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schedule_path = path.into();
        self
    }

    /// `None` disables the log file; stderr logging stays on.
    pub fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }

    /// Default log file name inside the scripts directory.
    pub fn with_log_name(self, name: &str) -> Self {
        let path = self.scripts_dir().join(name);
        self.with_log_path(Some(path))
    }

    pub fn adapter_settings(&self) -> AdapterSettings {
        AdapterSettings {
            timeout: self.request_timeout,
            markup: ZennMarkup::new(self.image_base_url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_live_under_scripts() {
        let config = PublisherConfig::for_repo("/repo");
        assert_eq!(config.schedule_path, PathBuf::from("/repo/scripts/schedule.json"));
        assert_eq!(config.env_file, PathBuf::from("/repo/scripts/.env"));
        assert_eq!(
            config.log_path.as_deref(),
            Some(Path::new("/repo/scripts/publish.log"))
        );
        assert_eq!(config.request_timeout, Duration::from_secs(30));

        let zenn = config.with_log_name(ZENN_PUBLISH_LOG);
        assert_eq!(
            zenn.log_path.as_deref(),
            Some(Path::new("/repo/scripts/zenn_publish.log"))
        );
    }
}
