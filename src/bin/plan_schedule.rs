//! Assign publish dates to a batch of articles and emit or merge schedule entries.

use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use crosspost_schedule::app::{self, PlanRequest, PlanSource};
use crosspost_schedule::calendar::{DEFAULT_CADENCE, PublishCalendar};
use crosspost_schedule::cli::CommonArgs;
use crosspost_schedule::config::{PUBLISH_LOG, PublisherConfig};
use crosspost_schedule::logging::start_session;
use crosspost_schedule::planner::{DEFAULT_CROSSPOST_DELAY, PlanError, PlanOptions, parse_slugs};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate a publication schedule for a batch of articles.
#[derive(Parser)]
#[command(name = "plan-schedule", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["slugs", "input"])))]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// First article publishes on or after this date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: NaiveDate,

    /// Comma-separated article slugs in priority order (highest first).
    #[arg(long)]
    slugs: Option<String>,

    /// JSON file with scored articles, sorted by total score.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Comma-separated publish days.
    #[arg(long, default_value = DEFAULT_CADENCE)]
    cadence: String,

    /// Days between the primary publish and the cross-post.
    #[arg(long, default_value_t = DEFAULT_CROSSPOST_DELAY, allow_negative_numbers = true)]
    crosspost_delay: i64,

    /// Dates to leave out of the cadence.
    #[arg(long, value_delimiter = ',', value_name = "YYYY-MM-DD,...")]
    skip_dates: Vec<NaiveDate>,

    /// Base URL for the generated canonical links.
    #[arg(long, env = "PUBLISH_ZENN_BASE_URL")]
    zenn_base_url: Option<String>,

    /// Merge into the schedule instead of printing JSON.
    #[arg(long)]
    merge: bool,

    /// Show the schedule without writing it.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = cli.common.config(PUBLISH_LOG).with_log_path(cli.common.log_file.clone());
    if let Some(url) = &cli.zenn_base_url {
        config.zenn_base_url = url.clone();
    }
    let _log = start_session(config.log_path.as_deref());

    let result = build_request(&cli, &config)
        .map_err(app::AppError::from)
        .and_then(|request| app::run_plan(&config, &request, &mut io::stdout().lock()))
        .map(|_| 0);
    app::finish(result)
}

fn build_request(cli: &Cli, config: &PublisherConfig) -> Result<PlanRequest, PlanError> {
    let mut calendar = PublishCalendar::parse_cadence(&cli.cadence)?;
    calendar.add_blackouts(&cli.skip_dates);

    let mut options = PlanOptions::new(cli.start);
    options.calendar = calendar;
    options.crosspost_delay = cli.crosspost_delay;
    options.zenn_base_url = config.zenn_base_url.clone();

    let source = match (&cli.slugs, &cli.input) {
        (_, Some(path)) => PlanSource::Scores(path.clone()),
        (Some(slugs), None) => PlanSource::Slugs(parse_slugs(slugs)),
        (None, None) => return Err(PlanError::NoSlugs),
    };
    Ok(PlanRequest {
        source,
        options,
        merge: cli.merge,
        dry_run: cli.dry_run,
    })
}
