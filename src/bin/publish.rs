//! Cross-post a single article by hand, outside the schedule.

use clap::Parser;
use crosspost_schedule::app;
use crosspost_schedule::cli::CommonArgs;
use crosspost_schedule::config::PUBLISH_LOG;
use crosspost_schedule::logging::start_session;
use crosspost_schedule::manual::{ManualRequest, UpdateTarget};
use crosspost_schedule::status::Platform;
use std::io;
use std::process::ExitCode;

/// Cross-post one Zenn article to Qiita, Dev.to or Hashnode.
#[derive(Parser)]
#[command(name = "publish", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Article path relative to the repository root.
    article: String,

    /// Target platform: qiita, devto or hashnode.
    #[arg(long)]
    platform: Platform,

    /// Update an existing article by id, or `auto` to find it by title.
    #[arg(long, value_name = "ID|auto")]
    update: Option<UpdateTarget>,

    /// Canonical URL of the original article.
    #[arg(long)]
    canonical_url: Option<String>,

    /// Print the converted payload without sending it.
    #[arg(long)]
    dry_run: bool,

    /// Send a file from articles/ to Dev.to or Hashnode without an English version.
    #[arg(long)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.common.config(PUBLISH_LOG);
    let _log = start_session(config.log_path.as_deref());

    let request = ManualRequest {
        article: cli.article,
        platform: cli.platform,
        update: cli.update,
        canonical_url: cli.canonical_url,
        dry_run: cli.dry_run,
        force: cli.force,
    };
    let result = app::run_manual_publish(&config, &request, &mut io::stdout().lock()).map(|_| 0);
    app::finish(result)
}
