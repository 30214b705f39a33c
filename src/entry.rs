use crate::field::Field;
use crate::status::{self, Platform, PlatformStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One scheduled article's cross-post record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Path of the source document, relative to the repository root.
    pub file: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub canonical_url: Field<String>,
    /// Primary (Zenn) publish date.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub zenn_date: Field<NaiveDate>,
    /// Cross-post due date.
    pub date: NaiveDate,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "status::deserialize_present"
    )]
    pub qiita: Option<PlatformStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "status::deserialize_present"
    )]
    pub devto: Option<PlatformStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "status::deserialize_present"
    )]
    pub hashnode: Option<PlatformStatus>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub depends_on: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub zenn_published: Field<bool>,
    /// Fields owned by sibling tooling; carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    pub fn new(file: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            file: file.into(),
            canonical_url: Field::Absent,
            zenn_date: Field::Absent,
            date,
            qiita: None,
            devto: None,
            hashnode: None,
            depends_on: Field::Absent,
            zenn_published: Field::Absent,
            extra: Map::new(),
        }
    }

    pub fn with_status(mut self, platform: Platform, status: PlatformStatus) -> Self {
        *self.slot_mut(platform) = Some(status);
        self
    }

    pub fn status(&self, platform: Platform) -> Option<&PlatformStatus> {
        match platform {
            Platform::Qiita => self.qiita.as_ref(),
            Platform::Devto => self.devto.as_ref(),
            Platform::Hashnode => self.hashnode.as_ref(),
        }
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut Option<PlatformStatus> {
        match platform {
            Platform::Qiita => &mut self.qiita,
            Platform::Devto => &mut self.devto,
            Platform::Hashnode => &mut self.hashnode,
        }
    }

    /// Platform fields present on this entry, in processing order.
    pub fn platforms(&self) -> impl Iterator<Item = (Platform, &PlatformStatus)> + '_ {
        Platform::ALL
            .into_iter()
            .filter_map(move |platform| self.status(platform).map(|status| (platform, status)))
    }

    pub fn zenn_date(&self) -> Option<NaiveDate> {
        self.zenn_date.value().copied()
    }

    pub fn is_zenn_published(&self) -> bool {
        self.zenn_published.value().copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("{platform} already holds {existing}; refusing to overwrite")]
    AlreadyPosted { platform: Platform, existing: String },
    #[error("{platform} is not configured on {file}")]
    NotConfigured { platform: Platform, file: String },
    #[error("{platform} returned an empty URL")]
    EmptyUrl { platform: Platform },
}

/// Validated partial update for one entry.
///
/// Built up while an entry is processed and applied once at the end, producing
/// a new [`Entry`] rather than mutating the original.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    posted: Vec<(Platform, String)>,
    zenn_published: Option<bool>,
}

impl EntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(mut self, platform: Platform, url: impl Into<String>) -> Self {
        self.record_posted(platform, url);
        self
    }

    pub fn record_posted(&mut self, platform: Platform, url: impl Into<String>) {
        self.posted.push((platform, url.into()));
    }

    pub fn zenn_published(mut self) -> Self {
        self.zenn_published = Some(true);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.posted.is_empty() && self.zenn_published.is_none()
    }

    pub fn posted_count(&self) -> usize {
        self.posted.len()
    }

    pub fn apply(&self, entry: &Entry) -> Result<Entry, PatchError> {
        let mut updated = entry.clone();
        for (platform, url) in &self.posted {
            if url.trim().is_empty() {
                return Err(PatchError::EmptyUrl {
                    platform: *platform,
                });
            }
            match updated.status(*platform) {
                None => {
                    return Err(PatchError::NotConfigured {
                        platform: *platform,
                        file: entry.file.clone(),
                    });
                }
                Some(PlatformStatus::Posted(existing)) => {
                    return Err(PatchError::AlreadyPosted {
                        platform: *platform,
                        existing: existing.clone(),
                    });
                }
                Some(_) => {}
            }
            *updated.slot_mut(*platform) = Some(PlatformStatus::Posted(url.clone()));
        }
        if let Some(flag) = self.zenn_published {
            updated.zenn_published = Field::Value(flag);
        }
        Ok(updated)
    }
}
