//! Pure classification of schedule entries.
//!
//! Nothing here performs I/O or logs; callers decide what to do with the
//! answers (the orchestrator, the status report, credential resolution).

use crate::entry::Entry;
use crate::schedule::ScheduleDocument;
use crate::status::{Platform, PlatformStatus};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

/// `true` when the platform still has to be posted to.
///
/// An absent field needs posting; callers that only care about configured
/// platforms iterate [`Entry::platforms`].
pub fn needs_posting(status: Option<&PlatformStatus>) -> bool {
    match status {
        None => true,
        Some(status) => status.is_due(),
    }
}

/// Exact complement of [`needs_posting`].
pub fn counts_as_done(status: Option<&PlatformStatus>) -> bool {
    !needs_posting(status)
}

/// Every platform present on the entry is posted or not applicable.
pub fn is_entry_done(entry: &Entry) -> bool {
    entry
        .platforms()
        .all(|(_, status)| counts_as_done(Some(status)))
}

/// Platforms configured on the entry that still need posting.
pub fn pending_platforms(entry: &Entry) -> Vec<Platform> {
    entry
        .platforms()
        .filter(|(_, status)| needs_posting(Some(status)))
        .map(|(platform, _)| platform)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyCheck {
    /// No dependency, or the dependency is done.
    Satisfied,
    /// The referenced entry exists and is not done yet.
    Waiting { depends_on: String },
    /// The referenced entry is not in the document; treated as satisfied.
    Unresolved { depends_on: String },
}

impl DependencyCheck {
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, DependencyCheck::Waiting { .. })
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            DependencyCheck::Waiting { depends_on } => {
                Some(format!("Waiting for dependency: {depends_on}"))
            }
            _ => None,
        }
    }
}

pub fn dependency_satisfied(entry: &Entry, all_entries: &[Entry]) -> DependencyCheck {
    let Some(depends_on) = entry.depends_on.as_deref().filter(|dep| !dep.is_empty()) else {
        return DependencyCheck::Satisfied;
    };
    match all_entries.iter().find(|candidate| candidate.file == depends_on) {
        Some(dependency) if is_entry_done(dependency) => DependencyCheck::Satisfied,
        Some(_) => DependencyCheck::Waiting {
            depends_on: depends_on.to_string(),
        },
        None => DependencyCheck::Unresolved {
            depends_on: depends_on.to_string(),
        },
    }
}

/// The cross-post due date has arrived.
pub fn is_due_on(entry: &Entry, today: NaiveDate) -> bool {
    entry.date <= today
}

/// Overall label of an entry relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    Scheduled,
    Due,
    Posted,
}

impl EntryPhase {
    pub fn label(self) -> &'static str {
        match self {
            EntryPhase::Scheduled => "scheduled",
            EntryPhase::Due => "DUE",
            EntryPhase::Posted => "posted",
        }
    }
}

impl fmt::Display for EntryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn entry_phase(entry: &Entry, today: NaiveDate) -> EntryPhase {
    if is_entry_done(entry) {
        EntryPhase::Posted
    } else if is_due_on(entry, today) {
        EntryPhase::Due
    } else {
        EntryPhase::Scheduled
    }
}

/// Per-platform label for the status report.
pub fn platform_label(status: Option<&PlatformStatus>) -> &'static str {
    match status {
        None | Some(PlatformStatus::NotApplicable) => "n/a",
        Some(PlatformStatus::Due(_)) => "due",
        Some(PlatformStatus::Posted(_)) => "done",
    }
}

/// Whether an execute run on `today` would reach processing for this entry.
pub fn would_process(entry: &Entry, all_entries: &[Entry], today: NaiveDate) -> bool {
    is_due_on(entry, today)
        && !is_entry_done(entry)
        && dependency_satisfied(entry, all_entries).is_satisfied()
}

/// Platforms an execute run on `today` would call out to.
pub fn due_platforms(document: &ScheduleDocument, today: NaiveDate) -> BTreeSet<Platform> {
    document
        .articles
        .iter()
        .filter(|entry| would_process(entry, &document.articles, today))
        .flat_map(pending_platforms)
        .collect()
}
