use chrono::NaiveDate;
use crosspost_schedule::persistence::{
    PersistenceError, load_schedule_from_json, save_schedule_to_json,
};
use crosspost_schedule::status::DueMarker;
use crosspost_schedule::{
    Entry, Field, JsonScheduleStore, Platform, PlatformStatus, ScheduleDocument, ScheduleStore,
};
use serde_json::{Value, json};
use std::fs;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_json() -> Value {
    json!({
        "post_time_utc": "23:00",
        "owner": "content-team",
        "articles": [
            {
                "file": "articles/a.md",
                "canonical_url": "https://zenn.dev/u/articles/a",
                "zenn_date": "2026-02-24",
                "date": "2026-02-25",
                "qiita": null,
                "devto": "",
                "hashnode": "pending",
                "zenn_published": true,
                "score": {"total": 8.5, "search": 3},
                "notes": ["keep", "me"]
            },
            {
                "file": "articles/b.md",
                "date": "2026-03-01",
                "devto": "https://dev.to/u/b",
                "hashnode": "n/a",
                "depends_on": "articles/a.md"
            }
        ]
    })
}

#[test]
fn unknown_fields_and_due_spellings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    fs::write(&path, serde_json::to_string_pretty(&sample_json()).unwrap()).unwrap();

    let document = load_schedule_from_json(&path).unwrap();
    save_schedule_to_json(&document, &path).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, sample_json());
}

#[test]
fn loaded_entries_decode_status_variants() {
    let document: ScheduleDocument = serde_json::from_value(sample_json()).unwrap();
    let a = &document.articles[0];
    assert_eq!(a.qiita, Some(PlatformStatus::Due(DueMarker::Null)));
    assert_eq!(a.devto, Some(PlatformStatus::Due(DueMarker::Empty)));
    assert_eq!(a.hashnode, Some(PlatformStatus::Due(DueMarker::Pending)));
    assert_eq!(a.zenn_date(), Some(d(2026, 2, 24)));
    assert!(a.is_zenn_published());
    assert_eq!(a.extra["notes"], json!(["keep", "me"]));

    let b = &document.articles[1];
    assert_eq!(b.qiita, None);
    assert_eq!(b.devto, Some(PlatformStatus::Posted("https://dev.to/u/b".into())));
    assert_eq!(b.hashnode, Some(PlatformStatus::NotApplicable));
    assert_eq!(b.depends_on.as_deref(), Some("articles/a.md"));
    assert_eq!(document.extra["owner"], json!("content-team"));
}

#[test]
fn absent_platform_field_stays_absent_on_save() {
    let document = ScheduleDocument::new(vec![
        Entry::new("articles/c.md", d(2026, 4, 1)).with_status(Platform::Qiita, PlatformStatus::pending()),
    ]);
    let value = serde_json::to_value(&document).unwrap();
    let entry = &value["articles"][0];
    assert_eq!(entry["qiita"], json!("pending"));
    assert!(entry.get("devto").is_none());
    assert!(entry.get("hashnode").is_none());
    assert_eq!(value["post_time_utc"], json!("23:00"));
}

#[test]
fn explicit_nulls_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    let source = json!({
        "post_time_utc": null,
        "articles": [
            {
                "file": "a.md",
                "canonical_url": null,
                "zenn_date": null,
                "date": "2026-02-25",
                "devto": "pending",
                "depends_on": null,
                "zenn_published": null
            }
        ]
    });
    fs::write(&path, source.to_string()).unwrap();

    let document = load_schedule_from_json(&path).unwrap();
    let entry = &document.articles[0];
    assert_eq!(entry.canonical_url, Field::Null);
    assert_eq!(entry.depends_on.as_deref(), None);
    assert!(!entry.is_zenn_published());
    save_schedule_to_json(&document, &path).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, source);
}

#[test]
fn blank_zenn_date_reads_as_unset_and_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    let source = json!({
        "articles": [
            {"file": "a.md", "zenn_date": "", "date": "2026-02-25", "zenn_published": "yes"}
        ]
    });
    fs::write(&path, source.to_string()).unwrap();

    let document = load_schedule_from_json(&path).unwrap();
    let entry = &document.articles[0];
    assert_eq!(entry.zenn_date(), None);
    assert_eq!(entry.zenn_date, Field::Unparsed(json!("")));
    assert!(!entry.is_zenn_published());
    save_schedule_to_json(&document, &path).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, source);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonScheduleStore::new(dir.path().join("nope.json"));
    assert!(!store.exists());
    assert!(matches!(
        store.load_schedule(),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn malformed_json_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    fs::write(&path, "{ not json").unwrap();

    let err = load_schedule_from_json(&path).unwrap_err();
    assert!(matches!(err, PersistenceError::Malformed { .. }));
    assert!(err.to_string().contains("schedule.json"));
}

#[test]
fn entry_without_date_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    fs::write(&path, r#"{"articles": [{"file": "articles/a.md"}]}"#).unwrap();
    assert!(matches!(
        load_schedule_from_json(&path),
        Err(PersistenceError::Malformed { .. })
    ));
}

#[test]
fn save_replaces_file_without_leaving_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    let store = JsonScheduleStore::new(&path);

    let mut document = ScheduleDocument::new(vec![
        Entry::new("articles/a.md", d(2026, 2, 25)).with_status(Platform::Devto, PlatformStatus::pending()),
    ]);
    store.save_schedule(&document).unwrap();
    document.articles[0].devto = Some(PlatformStatus::Posted("https://dev.to/u/a".into()));
    store.save_schedule(&document).unwrap();

    assert_eq!(store.load_schedule().unwrap(), document);
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("schedule.json")]);
}
