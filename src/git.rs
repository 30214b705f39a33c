use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] io::Error),
    #[error("git {command} failed: {output}")]
    Command { command: String, output: String },
}

/// Publishing the edited source files to the content repository.
pub trait VersionControl {
    fn commit_and_push(&self, files: &[&str], message: &str) -> Result<(), GitError>;
}

/// Shells out to the `git` binary: `add` each file, `commit`, then `push`.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_root: PathBuf,
    remote: String,
    branch: String,
}

impl GitCli {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        self.remote = remote.into();
        self.branch = branch.into();
        self
    }

    fn output(&self, args: &[&str]) -> Result<Output, GitError> {
        Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(args)
            .output()
            .map_err(GitError::Spawn)
    }

    fn git(&self, args: &[&str]) -> Result<(), GitError> {
        let output = self.output(args)?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let output = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(GitError::Command {
            command: args.first().copied().unwrap_or_default().to_string(),
            output,
        })
    }

    /// `git diff --cached --quiet` exits 1 when the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool, GitError> {
        let output = self.output(&["diff", "--cached", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(GitError::Command {
                command: "diff".to_string(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

impl VersionControl for GitCli {
    /// A commit left behind by an earlier failed push is pushed as is.
    fn commit_and_push(&self, files: &[&str], message: &str) -> Result<(), GitError> {
        for &file in files {
            self.git(&["add", file])?;
        }
        if self.has_staged_changes()? {
            self.git(&["commit", "-m", message])?;
        }
        self.git(&["push", self.remote.as_str(), self.branch.as_str()])
    }
}
