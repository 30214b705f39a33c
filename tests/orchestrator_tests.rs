use chrono::NaiveDate;
use crosspost_schedule::article::Article;
use crosspost_schedule::orchestrator::{RunOutcome, RunError};
use crosspost_schedule::persistence::{PersistenceError, PersistenceResult};
use crosspost_schedule::{
    CrossPoster, Entry, Field, JsonScheduleStore, Platform, PlatformStatus, PublishOutcome, Publisher,
    PublisherSet, RunMode, ScheduleDocument, ScheduleStore,
};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Publisher that answers every call the same way and counts calls.
struct FakePublisher {
    platform: Platform,
    result: Result<String, String>,
    calls: Rc<Cell<usize>>,
    seen_canonical: Rc<RefCell<Vec<Option<String>>>>,
}

impl FakePublisher {
    fn ok(platform: Platform, url: &str) -> Self {
        Self::with_result(platform, Ok(url.to_string()))
    }

    fn failing(platform: Platform, error: &str) -> Self {
        Self::with_result(platform, Err(error.to_string()))
    }

    fn with_result(platform: Platform, result: Result<String, String>) -> Self {
        Self {
            platform,
            result,
            calls: Rc::new(Cell::new(0)),
            seen_canonical: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl Publisher for FakePublisher {
    fn target(&self) -> Platform {
        self.platform
    }

    fn publish(&self, _article: &Article, canonical_url: Option<&str>) -> PublishOutcome {
        self.calls.set(self.calls.get() + 1);
        self.seen_canonical
            .borrow_mut()
            .push(canonical_url.map(str::to_string));
        match &self.result {
            Ok(url) => PublishOutcome::published(self.platform, url.clone()),
            Err(e) => PublishOutcome::failed(self.platform, e),
        }
    }
}

/// In-memory store that records every saved document.
#[derive(Default)]
struct RecordingStore {
    saves: RefCell<Vec<ScheduleDocument>>,
}

impl ScheduleStore for RecordingStore {
    fn save_schedule(&self, schedule: &ScheduleDocument) -> PersistenceResult<()> {
        self.saves.borrow_mut().push(schedule.clone());
        Ok(())
    }

    fn load_schedule(&self) -> PersistenceResult<ScheduleDocument> {
        self.saves
            .borrow()
            .last()
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound("memory".into()))
    }
}

/// Store whose saves always fail.
struct FailingStore;

impl ScheduleStore for FailingStore {
    fn save_schedule(&self, _schedule: &ScheduleDocument) -> PersistenceResult<()> {
        Err(PersistenceError::Io(io::Error::other("disk full")))
    }

    fn load_schedule(&self) -> PersistenceResult<ScheduleDocument> {
        Err(PersistenceError::NotFound("nowhere".into()))
    }
}

fn repo_with_articles(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        write_article(dir.path(), file, &format!("Title of {file}"));
    }
    dir
}

fn write_article(root: &Path, file: &str, title: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!("---\ntitle: \"{title}\"\ntopics: [\"rust\"]\npublished: true\n---\nBody of {file}\n"),
    )
    .unwrap();
}

fn pending_devto(file: &str, date: NaiveDate) -> Entry {
    Entry::new(file, date)
        .with_status(Platform::Devto, PlatformStatus::pending())
        .with_status(Platform::Hashnode, PlatformStatus::NotApplicable)
}

#[test]
fn successful_post_records_url_and_completes_entry() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/a");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);
    let mut document = ScheduleDocument::new(vec![pending_devto("articles/a.md", d(2026, 2, 25))]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(report.processed, 1);
    assert_eq!(report.posted, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(report.exit_code(), 0);
    let entry = &document.articles[0];
    assert_eq!(entry.devto, Some(PlatformStatus::Posted("https://dev.to/u/a".into())));
    assert!(crosspost_schedule::evaluator::is_entry_done(entry));
    assert_eq!(store.saves.borrow().len(), 1);
    assert_eq!(store.saves.borrow()[0], document);
}

#[test]
fn failed_post_leaves_entry_unchanged_and_counts_error() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let publishers = PublisherSet::new().with(FakePublisher::failing(Platform::Devto, "500: boom"));
    let original = pending_devto("articles/a.md", d(2026, 2, 25));
    let mut document = ScheduleDocument::new(vec![original.clone()]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(document.articles[0], original);
    assert_eq!(report.errors, 1);
    assert_eq!(report.exit_code(), 1);
    assert!(store.saves.borrow().is_empty());
}

#[test]
fn future_entry_is_carried_forward_without_calls() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/a");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);
    let original = pending_devto("articles/a.md", d(2026, 3, 1));
    let mut document = ScheduleDocument::new(vec![original.clone()]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(calls.get(), 0);
    assert_eq!(document.articles[0], original);
    assert_eq!(report.outcome, RunOutcome::NothingDue);
    assert_eq!(report.to_string(), "Nothing due today.");
}

#[test]
fn dependent_entry_runs_once_dependency_is_done() {
    let repo = repo_with_articles(&["articles/x.md", "articles/y.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/y");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);

    let x = Entry::new("articles/x.md", d(2026, 2, 20))
        .with_status(Platform::Devto, PlatformStatus::NotApplicable)
        .with_status(Platform::Hashnode, PlatformStatus::NotApplicable);
    let mut y = Entry::new("articles/y.md", d(2026, 2, 21))
        .with_status(Platform::Devto, PlatformStatus::pending());
    y.depends_on = Field::Value("articles/x.md".into());
    let mut document = ScheduleDocument::new(vec![x, y]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(
        document.articles[1].devto,
        Some(PlatformStatus::Posted("https://dev.to/u/y".into()))
    );
}

#[test]
fn dependent_entry_waits_for_pending_dependency() {
    // Dependency is due later, so it stays pending through the run.
    let repo = repo_with_articles(&["articles/x.md", "articles/y.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/y");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);

    let x = pending_devto("articles/x.md", d(2026, 3, 10));
    let mut y = pending_devto("articles/y.md", d(2026, 2, 21));
    y.depends_on = Field::Value("articles/x.md".into());
    let original_y = y.clone();
    let mut document = ScheduleDocument::new(vec![x, y]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(calls.get(), 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.processed, 0);
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(document.articles[1], original_y);
}

#[test]
fn dependency_posted_in_this_run_unblocks_entry_on_next_run() {
    let repo = repo_with_articles(&["articles/x.md", "articles/y.md"]);
    let store = RecordingStore::default();
    let publishers = PublisherSet::new().with(FakePublisher::ok(Platform::Devto, "https://dev.to/u/1"));

    let x = pending_devto("articles/x.md", d(2026, 2, 20));
    let mut y = pending_devto("articles/y.md", d(2026, 2, 21));
    y.depends_on = Field::Value("articles/x.md".into());
    let mut document = ScheduleDocument::new(vec![x, y]);

    let poster = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25));
    let first = poster.run(&mut document).unwrap();
    assert_eq!(first.processed, 1);
    assert_eq!(first.skipped, 1);
    assert!(document.articles[1].devto.as_ref().unwrap().is_due());

    let second = poster.run(&mut document).unwrap();
    assert_eq!(second.processed, 1);
    assert_eq!(second.skipped, 0);
    assert_eq!(store.saves.borrow().len(), 2);
}

#[test]
fn dependent_platforms_stay_outside_the_credential_check_until_next_run() {
    // Y needs Qiita but only waits on X; the run must not reach Y's platform.
    let repo = repo_with_articles(&["articles/x.md", "articles/y.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/x");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);

    let x = pending_devto("articles/x.md", d(2026, 2, 20));
    let mut y = Entry::new("articles/y.md", d(2026, 2, 21))
        .with_status(Platform::Qiita, PlatformStatus::pending())
        .with_status(Platform::Devto, PlatformStatus::NotApplicable)
        .with_status(Platform::Hashnode, PlatformStatus::NotApplicable);
    y.depends_on = Field::Value("articles/x.md".into());
    let mut document = ScheduleDocument::new(vec![x, y.clone()]);

    let needed = crosspost_schedule::evaluator::due_platforms(&document, d(2026, 2, 25));
    assert_eq!(needed.into_iter().collect::<Vec<_>>(), vec![Platform::Devto]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(document.articles[1], y);

    let next = crosspost_schedule::evaluator::due_platforms(&document, d(2026, 2, 26));
    assert_eq!(next.into_iter().collect::<Vec<_>>(), vec![Platform::Qiita]);
}

#[test]
fn unknown_dependency_is_treated_as_satisfied() {
    let repo = repo_with_articles(&["articles/y.md"]);
    let store = RecordingStore::default();
    let publishers = PublisherSet::new().with(FakePublisher::ok(Platform::Devto, "https://dev.to/u/y"));
    let mut y = pending_devto("articles/y.md", d(2026, 2, 21));
    y.depends_on = Field::Value("articles/gone.md".into());
    let mut document = ScheduleDocument::new(vec![y]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.posted, 1);
}

#[test]
fn second_run_makes_no_calls_and_no_writes() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/a");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);
    let mut document = ScheduleDocument::new(vec![pending_devto("articles/a.md", d(2026, 2, 25))]);

    let poster = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25));
    poster.run(&mut document).unwrap();
    let after_first = document.clone();
    let second = poster.run(&mut document).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(store.saves.borrow().len(), 1);
    assert_eq!(document, after_first);
    assert_eq!(second.outcome, RunOutcome::NothingDue);
}

#[test]
fn partial_success_keeps_the_posted_url() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let publishers = PublisherSet::new()
        .with(FakePublisher::ok(Platform::Qiita, "https://qiita.com/u/items/1"))
        .with(FakePublisher::failing(Platform::Devto, "timeout"));
    let entry = Entry::new("articles/a.md", d(2026, 2, 25))
        .with_status(Platform::Qiita, PlatformStatus::from_raw(None))
        .with_status(Platform::Devto, PlatformStatus::from_raw(Some("")));
    let mut document = ScheduleDocument::new(vec![entry]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    let entry = &document.articles[0];
    assert_eq!(
        entry.qiita,
        Some(PlatformStatus::Posted("https://qiita.com/u/items/1".into()))
    );
    assert_eq!(entry.devto, Some(PlatformStatus::from_raw(Some(""))));
    assert_eq!(report.errors, 1);
    assert_eq!(report.posted, 1);
    assert_eq!(store.saves.borrow().len(), 1);
}

#[test]
fn canonical_url_is_passed_to_publishers() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/a");
    let seen = devto.seen_canonical.clone();
    let publishers = PublisherSet::new().with(devto);
    let mut entry = pending_devto("articles/a.md", d(2026, 2, 25));
    entry.canonical_url = Field::Value("https://zenn.dev/u/articles/a".into());
    let mut document = ScheduleDocument::new(vec![entry]);

    CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![Some("https://zenn.dev/u/articles/a".to_string())]
    );
}

#[test]
fn missing_publisher_counts_as_error() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let publishers = PublisherSet::new();
    let mut document = ScheduleDocument::new(vec![pending_devto("articles/a.md", d(2026, 2, 25))]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(report.errors, 1);
    assert!(store.saves.borrow().is_empty());
}

#[test]
fn dry_run_calls_nothing_and_writes_nothing() {
    let repo = repo_with_articles(&["articles/a.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/a");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);
    let original = pending_devto("articles/a.md", d(2026, 2, 25));
    let mut document = ScheduleDocument::new(vec![original.clone()]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .with_mode(RunMode::DryRun)
        .run(&mut document)
        .unwrap();

    assert_eq!(calls.get(), 0);
    assert!(store.saves.borrow().is_empty());
    assert_eq!(document.articles[0], original);
    assert_eq!(report.processed, 1);
    assert!(report.to_string().starts_with("[DRY-RUN] 1 article(s) would be posted"));
}

#[test]
fn missing_file_and_traversal_are_entry_errors() {
    let repo = repo_with_articles(&["articles/ok.md"]);
    let store = RecordingStore::default();
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/ok");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);
    let mut document = ScheduleDocument::new(vec![
        pending_devto("articles/missing.md", d(2026, 2, 25)),
        pending_devto("../outside.md", d(2026, 2, 25)),
        pending_devto("articles/ok.md", d(2026, 2, 25)),
    ]);

    let report = CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    assert_eq!(report.errors, 2);
    assert_eq!(report.processed, 3);
    assert_eq!(calls.get(), 1);
    assert!(document.articles[0].devto.as_ref().unwrap().is_due());
    assert!(document.articles[1].devto.as_ref().unwrap().is_due());
    assert!(document.articles[2].devto.as_ref().unwrap().url().is_some());
}

#[test]
fn failed_checkpoint_aborts_the_run() {
    let repo = repo_with_articles(&["articles/a.md", "articles/b.md"]);
    let devto = FakePublisher::ok(Platform::Devto, "https://dev.to/u/a");
    let calls = devto.calls.clone();
    let publishers = PublisherSet::new().with(devto);
    let mut document = ScheduleDocument::new(vec![
        pending_devto("articles/a.md", d(2026, 2, 25)),
        pending_devto("articles/b.md", d(2026, 2, 25)),
    ]);

    let err = CrossPoster::new(&FailingStore, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap_err();

    let RunError::Checkpoint { file, .. } = err;
    assert_eq!(file, "articles/a.md");
    assert_eq!(calls.get(), 1);
}

#[test]
fn checkpoint_is_durable_between_entries() {
    // After a crash on the second entry, the file already holds the first URL.
    let repo = repo_with_articles(&["articles/a.md", "articles/b.md"]);
    let schedule = repo.path().join("scripts/schedule.json");
    fs::create_dir_all(schedule.parent().unwrap()).unwrap();
    let store = JsonScheduleStore::new(&schedule);
    let publishers = PublisherSet::new().with(FakePublisher::ok(Platform::Devto, "https://dev.to/u/a"));
    let mut document = ScheduleDocument::new(vec![
        pending_devto("articles/a.md", d(2026, 2, 25)),
        pending_devto("articles/b.md", d(2026, 2, 26)),
    ]);
    store.save_schedule(&document).unwrap();

    CrossPoster::new(&store, &publishers, repo.path(), d(2026, 2, 25))
        .run(&mut document)
        .unwrap();

    let on_disk = store.load_schedule().unwrap();
    assert_eq!(on_disk, document);
    assert_eq!(
        on_disk.articles[0].devto,
        Some(PlatformStatus::Posted("https://dev.to/u/a".into()))
    );
    assert!(on_disk.articles[1].devto.as_ref().unwrap().is_due());
}
