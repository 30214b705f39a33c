//! Read-only views of the schedule: the cross-post status table, its CSV
//! export, and the primary publish status.

use crate::article::resolve_article_path;
use crate::entry::Entry;
use crate::evaluator::{entry_phase, platform_label};
use crate::graph::ScheduleDiagnostics;
use crate::primary::published_flag;
use crate::schedule::ScheduleDocument;
use crate::status::Platform;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(ReportFormat::Table),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unknown format '{other}' (expected table or csv)")),
        }
    }
}

/// One line of the cross-post status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub date: String,
    pub file: String,
    pub qiita: &'static str,
    pub devto: &'static str,
    pub hashnode: &'static str,
    pub status: &'static str,
}

impl StatusRow {
    const HEADERS: [&'static str; 6] = ["Date", "File", "Qiita", "Dev.to", "Hashnode", "Status"];

    fn cells(&self) -> [&str; 6] {
        [
            self.date.as_str(),
            self.file.as_str(),
            self.qiita,
            self.devto,
            self.hashnode,
            self.status,
        ]
    }
}

pub fn status_rows(document: &ScheduleDocument, today: NaiveDate) -> Vec<StatusRow> {
    document
        .articles
        .iter()
        .map(|entry| StatusRow {
            date: entry.date.to_string(),
            file: entry.file.clone(),
            qiita: platform_label(entry.status(Platform::Qiita)),
            devto: platform_label(entry.status(Platform::Devto)),
            hashnode: platform_label(entry.status(Platform::Hashnode)),
            status: entry_phase(entry, today).label(),
        })
        .collect()
}

pub fn render_status_table(rows: &[StatusRow]) -> String {
    let body: Vec<Vec<&str>> = rows.iter().map(|row| row.cells().to_vec()).collect();
    render_text_table(&StatusRow::HEADERS, &body)
}

pub fn write_status_csv<W: Write>(rows: &[StatusRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(StatusRow::HEADERS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Warnings for structural problems, one per line.
pub fn diagnostics_lines(document: &ScheduleDocument) -> Vec<String> {
    ScheduleDiagnostics::collect(&document.articles).messages()
}

/// One line of the primary publish status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryStatusRow {
    pub zenn_date: String,
    pub file: String,
    pub published: bool,
    pub status: &'static str,
}

/// Entries with a `zenn_date`; published means tracked on the entry or
/// already `published: true` in the file.
pub fn primary_status_rows(
    document: &ScheduleDocument,
    repo_root: &Path,
    today: NaiveDate,
) -> Vec<PrimaryStatusRow> {
    document
        .articles
        .iter()
        .filter_map(|entry| {
            let zenn_date = entry.zenn_date()?;
            let in_file = resolve_article_path(repo_root, &entry.file)
                .ok()
                .and_then(|path| fs::read_to_string(path).ok())
                .and_then(|content| published_flag(&content))
                .unwrap_or(false);
            let published = entry.is_zenn_published() || in_file;
            let status = if published {
                "published"
            } else if zenn_date <= today {
                "DUE"
            } else {
                "scheduled"
            };
            Some(PrimaryStatusRow {
                zenn_date: zenn_date.to_string(),
                file: entry.file.clone(),
                published,
                status,
            })
        })
        .collect()
}

pub fn render_primary_table(rows: &[PrimaryStatusRow]) -> String {
    let published: Vec<String> = rows.iter().map(|row| row.published.to_string()).collect();
    let body: Vec<Vec<&str>> = rows
        .iter()
        .zip(&published)
        .map(|(row, published)| {
            vec![
                row.zenn_date.as_str(),
                row.file.as_str(),
                published.as_str(),
                row.status,
            ]
        })
        .collect();
    render_text_table(&["zenn_date", "File", "zenn_published", "Status"], &body)
}

/// Preview of generated entries: publish date, cross-post date, file, total score.
pub fn render_plan_table(entries: &[Entry]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            let score = entry
                .extra
                .get("score")
                .and_then(|score| score.get("total"))
                .map(|total| total.to_string())
                .unwrap_or_else(|| "-".to_string());
            vec![
                entry.zenn_date().map(|d| d.to_string()).unwrap_or_default(),
                entry.date.to_string(),
                entry.file.clone(),
                score,
            ]
        })
        .collect();
    render_text_table(&["Date", "Cross-post", "File", "Score"], &rows)
}

/// Boxed plain-text table; column widths follow the widest cell.
pub fn render_text_table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate().take(widths.len()) {
            widths[ci] = widths[ci].max(cell.as_ref().chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, headers, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    out.push('|');
    for (ci, width) in widths.iter().enumerate() {
        let cell: &str = cells.get(ci).map(|cell| cell.as_ref()).unwrap_or("");
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
        out.push_str(" |");
    }
    out.push('\n');
}
