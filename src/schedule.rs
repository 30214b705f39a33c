use crate::entry::Entry;
use crate::field::Field;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_POST_TIME_UTC: &str = "23:00";

/// The persisted schedule: an ordered list of entries plus document-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    /// Informational only.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub post_time_utc: Field<String>,
    pub articles: Vec<Entry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ScheduleDocument {
    fn default() -> Self {
        Self {
            post_time_utc: Field::Value(DEFAULT_POST_TIME_UTC.to_string()),
            articles: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl ScheduleDocument {
    pub fn new(articles: Vec<Entry>) -> Self {
        Self {
            articles,
            ..Self::default()
        }
    }

    pub fn find(&self, file: &str) -> Option<&Entry> {
        self.articles.iter().find(|entry| entry.file == file)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.find(file).is_some()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
