//! Announcement history.
//!
//! One record per announcement message that has not been retracted yet. The
//! set is read whole at the start of a run and written whole at the end of
//! it, as a JSON array:
//!
//! ```json
//! [{"event_id": "...", "message_id": "...", "channel_id": "..."}]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EventsBotError, EventsBotResult};

/// An announcement posted for a scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub event_id: String,
    pub message_id: String,
    pub channel_id: String,
}

/// Storage for announcement records, loaded and saved as a whole.
pub trait HistoryStore {
    /// Replace the in-memory records with the persisted ones.
    fn load(&mut self) -> EventsBotResult<()>;

    /// Persist the in-memory records, replacing what was stored.
    fn save(&self) -> EventsBotResult<()>;

    fn append(&mut self, record: HistoryRecord);

    /// Drop every record matching `predicate`, returning the dropped ones.
    fn remove_where(
        &mut self,
        predicate: &mut dyn FnMut(&HistoryRecord) -> bool,
    ) -> Vec<HistoryRecord>;

    fn records(&self) -> &[HistoryRecord];
}

/// History kept in a JSON file.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    records: Vec<HistoryRecord>,
}

impl FileHistory {
    /// Open the history at `path`, creating an empty one if needed.
    pub fn open(path: impl Into<PathBuf>) -> EventsBotResult<Self> {
        let path = path.into();
        Self::ensure(&path)?;
        let records = Self::read(&path)?;
        Ok(FileHistory { path, records })
    }

    /// Create an empty history (`[]`) at `path` unless a file is already
    /// there. Parent directories are created as needed.
    pub fn ensure(path: &Path) -> EventsBotResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        if !path.exists() {
            std::fs::write(path, "[]")?;
        }

        Ok(())
    }

    /// Read the records stored at `path`.
    ///
    /// Malformed content is logged and read as an empty history: the bot
    /// loses track of what to retract but keeps running.
    pub fn read(path: &Path) -> EventsBotResult<Vec<HistoryRecord>> {
        let content = std::fs::read_to_string(path)?;

        match serde_json::from_str(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Corrupted history file, resetting it. Messages posted by the bot may have to be cleaned up manually"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the history at `path` with `records`.
    pub fn write(path: &Path, records: &[HistoryRecord]) -> EventsBotResult<()> {
        let content = serde_json::to_string(records)
            .map_err(|e| EventsBotError::Serialization(e.to_string()))?;

        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, path)?;
        Ok(())
    }
}

impl HistoryStore for FileHistory {
    fn load(&mut self) -> EventsBotResult<()> {
        Self::ensure(&self.path)?;
        self.records = Self::read(&self.path)?;
        Ok(())
    }

    fn save(&self) -> EventsBotResult<()> {
        Self::write(&self.path, &self.records)
    }

    fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    fn remove_where(
        &mut self,
        predicate: &mut dyn FnMut(&HistoryRecord) -> bool,
    ) -> Vec<HistoryRecord> {
        let (removed, kept) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|record| predicate(record));
        self.records = kept;
        removed
    }

    fn records(&self) -> &[HistoryRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32) -> HistoryRecord {
        HistoryRecord {
            event_id: format!("event-{n}"),
            message_id: format!("message-{n}"),
            channel_id: "channel".to_string(),
        }
    }

    #[test]
    fn test_open_creates_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/history");

        let history = FileHistory::open(&path).unwrap();
        assert!(history.records().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_ensure_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        FileHistory::write(&path, &[record(1)]).unwrap();

        FileHistory::ensure(&path).unwrap();
        assert_eq!(FileHistory::read(&path).unwrap(), vec![record(1)]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        let mut history = FileHistory::open(&path).unwrap();
        history.append(record(1));
        history.append(record(2));
        history.save().unwrap();

        let mut reopened = FileHistory::open(&path).unwrap();
        reopened.load().unwrap();
        assert_eq!(reopened.records(), &[record(1), record(2)]);
        assert!(!dir.path().join("history.tmp").exists());
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        FileHistory::write(&path, &[record(7)]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([{"event_id": "event-7", "message_id": "message-7", "channel_id": "channel"}])
        );
    }

    #[test]
    fn test_corrupted_history_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        std::fs::write(&path, "{not json").unwrap();

        let history = FileHistory::open(&path).unwrap();
        assert!(history.records().is_empty());
    }

    #[test]
    fn test_remove_where() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = FileHistory::open(dir.path().join("history")).unwrap();
        for n in 1..=3 {
            history.append(record(n));
        }

        let removed = history.remove_where(&mut |r| r.event_id == "event-2");
        assert_eq!(removed, vec![record(2)]);
        assert_eq!(history.records(), &[record(1), record(3)]);
    }
}
