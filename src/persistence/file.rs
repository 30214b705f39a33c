use super::{PersistenceError, PersistenceResult, ScheduleStore};
use crate::schedule::ScheduleDocument;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Schedule document stored as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonScheduleStore {
    path: PathBuf,
}

impl JsonScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl ScheduleStore for JsonScheduleStore {
    fn save_schedule(&self, schedule: &ScheduleDocument) -> PersistenceResult<()> {
        save_schedule_to_json(schedule, &self.path)
    }

    fn load_schedule(&self) -> PersistenceResult<ScheduleDocument> {
        load_schedule_from_json(&self.path)
    }
}

/// Overwrites `path` with the whole document.
///
/// The JSON is written to a sibling temp file first and renamed into place.
pub fn save_schedule_to_json<P: AsRef<Path>>(
    schedule: &ScheduleDocument,
    path: P,
) -> PersistenceResult<()> {
    let path = path.as_ref();
    let tmp_path = temp_path_for(path);
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, schedule)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}

pub fn load_schedule_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ScheduleDocument> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(PersistenceError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    serde_json::from_reader(BufReader::new(file)).map_err(|source| PersistenceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "schedule.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
