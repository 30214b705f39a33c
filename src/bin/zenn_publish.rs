//! Daily primary run: flip due Zenn articles to published, push, then cross-post.

use clap::Parser;
use crosspost_schedule::app;
use crosspost_schedule::cli::CommonArgs;
use crosspost_schedule::config::ZENN_PUBLISH_LOG;
use crosspost_schedule::git::GitCli;
use crosspost_schedule::logging::start_session;
use crosspost_schedule::orchestrator::RunMode;
use std::io;
use std::process::ExitCode;

/// Zenn auto-publisher.
#[derive(Parser)]
#[command(name = "zenn-publish", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Preview without changing files.
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show Zenn publish status.
    #[arg(long)]
    status: bool,

    /// Remote to push to.
    #[arg(long, default_value = "origin")]
    git_remote: String,

    /// Branch to push.
    #[arg(long, default_value = "main")]
    git_branch: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = cli.common.config(ZENN_PUBLISH_LOG);
    config.git_remote = cli.git_remote.clone();
    config.git_branch = cli.git_branch.clone();
    let today = cli.common.today();
    let _log = start_session(config.log_path.as_deref());

    let result = if cli.status {
        app::write_primary_status(&config, today, &mut io::stdout().lock()).map(|()| 0)
    } else {
        let git = GitCli::new(&config.repo_root).with_remote(&config.git_remote, &config.git_branch);
        app::run_primary(&config, &git, RunMode::from_dry_run(cli.dry_run), today)
            .map(|summary| summary.exit_code())
    };
    app::finish(result)
}
