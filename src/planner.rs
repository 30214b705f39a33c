use crate::calendar::{CadenceError, PublishCalendar};
use crate::entry::Entry;
use crate::field::Field;
use crate::persistence::{PersistenceError, load_schedule_from_json};
use crate::schedule::ScheduleDocument;
use crate::status::{DueMarker, Platform, PlatformStatus};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const ZENN_BASE_URL: &str = "https://zenn.dev/shimo4228/articles";
pub const DEFAULT_CROSSPOST_DELAY: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Cadence(#[from] CadenceError),
    #[error("failed to read scores file {}: {source}", .path.display())]
    ReadScores {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid scores file {}: {source}", .path.display())]
    ParseScores {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no publish day available on or after {0}")]
    NoPublishDate(NaiveDate),
    #[error("no article slugs given")]
    NoSlugs,
    #[error("crosspost delay must not be negative, got {0}")]
    NegativeDelay(i64),
    #[error("date out of range: {from} + {days} day(s)")]
    DateOutOfRange { from: NaiveDate, days: i64 },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// One row of a scored article list. Only `slug` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleScore {
    pub slug: String,
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
}

/// Score components carried onto the generated entry as `score`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fresh: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Number>,
}

impl ScoreBreakdown {
    fn total_value(&self) -> f64 {
        self.total.as_ref().and_then(Number::as_f64).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub start: NaiveDate,
    pub calendar: PublishCalendar,
    pub crosspost_delay: i64,
    pub zenn_base_url: String,
}

impl PlanOptions {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            calendar: PublishCalendar::default(),
            crosspost_delay: DEFAULT_CROSSPOST_DELAY,
            zenn_base_url: ZENN_BASE_URL.to_string(),
        }
    }
}

pub fn parse_slugs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .collect()
}

/// Assign publish dates to `slugs` in priority order.
///
/// Each slug takes the first cadence day on or after the cursor; the cursor
/// then moves to the day after that publish date.
pub fn generate_schedule(
    slugs: &[String],
    options: &PlanOptions,
    scores: Option<&HashMap<String, ScoreBreakdown>>,
) -> Result<Vec<Entry>, PlanError> {
    if slugs.is_empty() {
        return Err(PlanError::NoSlugs);
    }
    let delay = u64::try_from(options.crosspost_delay)
        .map_err(|_| PlanError::NegativeDelay(options.crosspost_delay))?;
    let base_url = options.zenn_base_url.trim_end_matches('/');
    let mut cursor = options.start;
    let mut entries = Vec::with_capacity(slugs.len());

    for slug in slugs {
        let zenn_date = options
            .calendar
            .next_publish_date(cursor)
            .ok_or(PlanError::NoPublishDate(cursor))?;
        let date = zenn_date
            .checked_add_days(Days::new(delay))
            .ok_or(PlanError::DateOutOfRange {
                from: zenn_date,
                days: options.crosspost_delay,
            })?;
        let mut entry = Entry::new(format!("articles/{slug}.md"), date)
            .with_status(Platform::Qiita, PlatformStatus::Due(DueMarker::Null))
            .with_status(Platform::Devto, PlatformStatus::NotApplicable)
            .with_status(Platform::Hashnode, PlatformStatus::NotApplicable);
        entry.canonical_url = Field::Value(format!("{base_url}/{slug}"));
        entry.zenn_date = Field::Value(zenn_date);

        if let Some(score) = scores.and_then(|scores| scores.get(slug)) {
            // Serializing a struct of optional numbers cannot fail.
            if let Ok(value) = serde_json::to_value(score) {
                entry.extra.insert("score".to_string(), value);
            }
        }

        entries.push(entry);
        cursor = zenn_date
            .succ_opt()
            .ok_or(PlanError::DateOutOfRange {
                from: zenn_date,
                days: 1,
            })?;
    }
    Ok(entries)
}

/// Slugs sorted by `total` (highest first, ties keep file order) and their scores.
pub fn load_scores(path: &Path) -> Result<(Vec<String>, HashMap<String, ScoreBreakdown>), PlanError> {
    let raw = fs::read_to_string(path).map_err(|source| PlanError::ReadScores {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rows: Vec<ArticleScore> =
        serde_json::from_str(&raw).map_err(|source| PlanError::ParseScores {
            path: path.to_path_buf(),
            source,
        })?;
    rows.sort_by(|a, b| {
        b.breakdown
            .total_value()
            .total_cmp(&a.breakdown.total_value())
    });

    let slugs = rows.iter().map(|row| row.slug.clone()).collect();
    let scores = rows
        .into_iter()
        .map(|row| (row.slug, row.breakdown))
        .collect();
    Ok((slugs, scores))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub already_present: Vec<String>,
}

/// Append entries whose `file` is not yet scheduled; existing entries win.
pub fn merge_into_schedule(document: &mut ScheduleDocument, entries: Vec<Entry>) -> MergeSummary {
    let mut summary = MergeSummary::default();
    for entry in entries {
        if document.contains(&entry.file) {
            summary.already_present.push(entry.file);
        } else {
            document.articles.push(entry);
            summary.added += 1;
        }
    }
    summary
}

/// The schedule at `path`, or an empty one when the file does not exist yet.
pub fn load_or_default(path: &Path) -> Result<ScheduleDocument, PlanError> {
    match load_schedule_from_json(path) {
        Ok(document) => Ok(document),
        Err(PersistenceError::NotFound(_)) => Ok(ScheduleDocument::default()),
        Err(e) => Err(e.into()),
    }
}
