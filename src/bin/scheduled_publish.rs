//! Daily cross-post run: publish due schedule entries to Qiita, Dev.to and Hashnode.

use clap::Parser;
use crosspost_schedule::app;
use crosspost_schedule::cli::CommonArgs;
use crosspost_schedule::config::PUBLISH_LOG;
use crosspost_schedule::logging::start_session;
use crosspost_schedule::orchestrator::RunMode;
use crosspost_schedule::report::ReportFormat;
use std::io;
use std::process::ExitCode;

/// Scheduled cross-post publisher.
#[derive(Parser)]
#[command(name = "scheduled-publish", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Preview without posting or saving.
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show schedule status.
    #[arg(long)]
    status: bool,

    /// Status output format: table or csv.
    #[arg(long, default_value = "table")]
    format: ReportFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.common.config(PUBLISH_LOG);
    let today = cli.common.today();
    let _log = start_session(config.log_path.as_deref());

    let result = if cli.status {
        app::write_status(&config, today, cli.format, &mut io::stdout().lock()).map(|()| 0)
    } else {
        app::run_crosspost(&config, RunMode::from_dry_run(cli.dry_run), today)
            .map(|report| report.exit_code())
    };
    app::finish(result)
}
