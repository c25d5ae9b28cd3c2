/// Tracking of seen files and proposed moves.
///
/// The engine itself keeps no state between runs. A [`Tracker`] lets the directory pass
/// remember which files it has seen and which moves it performed or abandoned.
/// [`JsonHistory`] keeps that record in a JSON file next to the sorted tree.
use crate::error::{SortError, SortResult};
use crate::naming::hash_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the history kept in the destination root.
pub const HISTORY_FILE_NAME: &str = ".dirsort_history.json";

/// A file the sorter has seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    /// Hash of the absolute path the file was seen at.
    pub filepath_hash: String,
    pub last_modified: DateTime<Utc>,
    pub added_at: DateTime<Utc>,
}

impl FileRecord {
    /// Builds a record for the file at `path`, reading its modification time.
    ///
    /// Falls back to the current time when the modification time is unavailable.
    pub fn for_path(path: &Path) -> Self {
        let now = Utc::now();
        let last_modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or(now);
        Self {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            filepath_hash: path_hash(path),
            last_modified,
            added_at: now,
        }
    }
}

/// A proposed move and whether it went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub filename: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub accepted: bool,
    pub added_at: DateTime<Utc>,
}

impl PathRecord {
    pub fn new(source: &Path, destination: &Path, accepted: bool) -> Self {
        Self {
            filename: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            accepted,
            added_at: Utc::now(),
        }
    }
}

/// Hash used to key files by their absolute path.
pub fn path_hash(path: &Path) -> String {
    hash_name(&path.to_string_lossy())
}

/// Append/query store for seen files and proposed moves.
pub trait Tracker {
    fn record_file(&mut self, record: FileRecord) -> SortResult<()>;

    fn record_path(&mut self, record: PathRecord) -> SortResult<()>;

    /// Returns true if a file was seen at the path with this hash.
    fn is_known(&self, filepath_hash: &str) -> bool;

    /// All proposed moves for files called `filename`, oldest first.
    fn paths_for(&self, filename: &str) -> Vec<PathRecord>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryData {
    files: Vec<FileRecord>,
    paths: Vec<PathRecord>,
}

/// [`Tracker`] backed by a JSON file. Records are kept in memory until [`JsonHistory::save`].
#[derive(Debug)]
pub struct JsonHistory {
    file: PathBuf,
    data: HistoryData,
}

impl JsonHistory {
    /// Returns the history file path for a destination root.
    pub fn file_path(root: &Path) -> PathBuf {
        root.join(HISTORY_FILE_NAME)
    }

    /// Loads the history of `root`, or starts an empty one if none exists yet.
    pub fn load(root: &Path) -> SortResult<Self> {
        let file = Self::file_path(root);
        if !file.exists() {
            return Ok(Self {
                file,
                data: HistoryData::default(),
            });
        }

        let json_string = fs::read_to_string(&file).map_err(SortError::HistoryReadFailed)?;
        let data = serde_json::from_str(&json_string).map_err(|e| {
            SortError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            }
        })?;
        Ok(Self { file, data })
    }

    /// Writes all records to disk.
    pub fn save(&self) -> SortResult<()> {
        let json_string = serde_json::to_string_pretty(&self.data).map_err(|e| {
            SortError::InvalidHistoryFormat {
                reason: format!("JSON serialization failed: {}", e),
            }
        })?;
        fs::write(&self.file, json_string).map_err(SortError::HistoryWriteFailed)
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.data.files
    }

    pub fn paths(&self) -> &[PathRecord] {
        &self.data.paths
    }
}

impl Tracker for JsonHistory {
    fn record_file(&mut self, record: FileRecord) -> SortResult<()> {
        if !self.is_known(&record.filepath_hash) {
            self.data.files.push(record);
        }
        Ok(())
    }

    fn record_path(&mut self, record: PathRecord) -> SortResult<()> {
        self.data.paths.push(record);
        Ok(())
    }

    fn is_known(&self, filepath_hash: &str) -> bool {
        self.data
            .files
            .iter()
            .any(|file| file.filepath_hash == filepath_hash)
    }

    fn paths_for(&self, filename: &str) -> Vec<PathRecord> {
        self.data
            .paths
            .iter()
            .filter(|record| record.filename == filename)
            .cloned()
            .collect()
    }
}
