//! Append-only score cache backed by a CSV file.
//!
//! The [`ResultCache`] maps item names to their scraped [`ScoreRecord`].
//!
//! **Durability rules:**
//! - every [`ResultCache::append`] rewrites the whole file before returning
//! - the rewrite goes to a sibling temp file that is renamed over the cache,
//!   so the file on disk is always a complete, loadable table
//! - existing records are never replaced or removed

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use gamescore_shared::{CACHE_HEADERS, GameScoreError, Result, ScoreRecord};
use tracing::{debug, info};

/// Durable name → record store.
#[derive(Debug)]
pub struct ResultCache {
    path: PathBuf,
    records: Vec<ScoreRecord>,
    index: HashMap<String, usize>,
}

impl ResultCache {
    /// Open the cache at `path`, loading it if the file exists.
    ///
    /// A file that names the same item twice is a storage error.
    pub fn open(path: &Path) -> Result<Self> {
        let records = Self::load(path)?;
        let mut cache = Self::fresh(path);
        for record in records {
            // Dropping a row here would erase it on the next rewrite.
            if cache.index.contains_key(&record.name) {
                return Err(GameScoreError::Storage(format!(
                    "{}: '{}' appears more than once",
                    path.display(),
                    record.name
                )));
            }
            cache.index.insert(record.name.clone(), cache.records.len());
            cache.records.push(record);
        }
        info!(path = %path.display(), records = cache.len(), "score cache loaded");
        Ok(cache)
    }

    /// An empty cache that ignores any existing file at `path`.
    /// The first append replaces that file.
    pub fn fresh(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Read every record from the cache file. A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Vec<ScoreRecord>> {
        if !path.exists() {
            debug!(path = %path.display(), "no cache file yet");
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(path).map_err(|e| storage_error(path, e))?;

        let headers = reader.headers().map_err(|e| storage_error(path, e))?;
        if headers.iter().ne(CACHE_HEADERS.iter().copied()) {
            return Err(GameScoreError::Storage(format!(
                "{}: unexpected header {:?}, expected {:?}",
                path.display(),
                headers.iter().collect::<Vec<_>>(),
                CACHE_HEADERS
            )));
        }

        reader
            .deserialize::<ScoreRecord>()
            .map(|row| row.map_err(|e| storage_error(path, e)))
            .collect()
    }

    /// The cached record for `name`, if it was scraped before.
    pub fn lookup(&self, name: &str) -> Option<&ScoreRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Add a new record and persist the whole cache before returning.
    ///
    /// Fails with a validation error if the name is already cached.
    pub fn append(&mut self, record: ScoreRecord) -> Result<()> {
        if self.contains(&record.name) {
            return Err(GameScoreError::validation(format!(
                "'{}' is already cached",
                record.name
            )));
        }

        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);

        if let Err(e) = self.persist() {
            // Keep memory consistent with what is on disk.
            if let Some(record) = self.records.pop() {
                self.index.remove(&record.name);
            }
            return Err(e);
        }

        debug!(records = self.records.len(), "score cache persisted");
        Ok(())
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| GameScoreError::io(parent, e))?;
            }
        }

        let tmp_path = temp_path(&self.path);
        let file = File::create(&tmp_path).map_err(|e| GameScoreError::io(&tmp_path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(CACHE_HEADERS)
            .map_err(|e| storage_error(&tmp_path, e))?;
        for record in &self.records {
            writer
                .serialize(record)
                .map_err(|e| storage_error(&tmp_path, e))?;
        }

        let file = writer.into_inner().map_err(|e| {
            GameScoreError::Storage(format!("{}: flush failed: {e}", tmp_path.display()))
        })?;
        file.sync_all().map_err(|e| GameScoreError::io(&tmp_path, e))?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| GameScoreError::io(&self.path, e))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn storage_error(path: &Path, e: csv::Error) -> GameScoreError {
    GameScoreError::Storage(format!("{}: {e}", path.display()))
}
