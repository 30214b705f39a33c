use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Secondary platforms an entry can be cross-posted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Qiita,
    Devto,
    Hashnode,
}

impl Platform {
    /// Processing order within one entry.
    pub const ALL: [Platform; 3] = [Platform::Qiita, Platform::Devto, Platform::Hashnode];

    /// Field name used in the schedule document.
    pub fn key(self) -> &'static str {
        match self {
            Platform::Qiita => "qiita",
            Platform::Devto => "devto",
            Platform::Hashnode => "hashnode",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Qiita => "Qiita",
            Platform::Devto => "Dev.to",
            Platform::Hashnode => "Hashnode",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qiita" => Ok(Platform::Qiita),
            "devto" | "dev.to" => Ok(Platform::Devto),
            "hashnode" => Ok(Platform::Hashnode),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

/// Legacy spelling a due field was stored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueMarker {
    #[default]
    Null,
    Empty,
    Pending,
}

/// State of one platform field on a schedule entry.
///
/// Stored in the document as `null` / `""` / `"pending"` (due), `"n/a"` (skipped)
/// or the URL of the published copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformStatus {
    Due(DueMarker),
    NotApplicable,
    Posted(String),
}

pub const PENDING: &str = "pending";
pub const NOT_APPLICABLE: &str = "n/a";

impl PlatformStatus {
    pub fn pending() -> Self {
        PlatformStatus::Due(DueMarker::Pending)
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => PlatformStatus::Due(DueMarker::Null),
            Some("") => PlatformStatus::Due(DueMarker::Empty),
            Some(PENDING) => PlatformStatus::Due(DueMarker::Pending),
            Some(NOT_APPLICABLE) => PlatformStatus::NotApplicable,
            Some(url) => PlatformStatus::Posted(url.to_string()),
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            PlatformStatus::Due(DueMarker::Null) => None,
            PlatformStatus::Due(DueMarker::Empty) => Some(""),
            PlatformStatus::Due(DueMarker::Pending) => Some(PENDING),
            PlatformStatus::NotApplicable => Some(NOT_APPLICABLE),
            PlatformStatus::Posted(url) => Some(url.as_str()),
        }
    }

    pub fn is_due(&self) -> bool {
        matches!(self, PlatformStatus::Due(_))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            PlatformStatus::Posted(url) => Some(url),
            _ => None,
        }
    }
}

impl Serialize for PlatformStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_raw() {
            Some(raw) => serializer.serialize_str(raw),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for PlatformStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(PlatformStatus::from_raw(raw.as_deref()))
    }
}

/// Keeps an explicit `null` distinguishable from an absent field.
pub(crate) fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<PlatformStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    PlatformStatus::deserialize(deserializer).map(Some)
}
