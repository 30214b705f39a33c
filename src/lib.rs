pub mod app;
pub mod article;
pub mod calendar;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod credentials;
pub mod entry;
pub mod evaluator;
pub mod field;
pub mod git;
pub mod graph;
pub mod logging;
pub mod manual;
pub mod markup;
pub mod orchestrator;
pub mod persistence;
pub mod planner;
pub mod platform;
pub mod primary;
pub mod report;
pub mod schedule;
pub mod status;

pub use article::Article;
pub use calendar::PublishCalendar;
pub use config::PublisherConfig;
pub use credentials::Credentials;
pub use entry::{Entry, EntryPatch};
pub use field::Field;
pub use orchestrator::{CrossPoster, RunMode, RunReport};
pub use persistence::{JsonScheduleStore, ScheduleStore};
pub use platform::{PlatformAdapter, PublishOutcome, Publisher, PublisherSet};
pub use schedule::ScheduleDocument;
pub use status::{Platform, PlatformStatus};
