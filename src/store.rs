use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Result, BleepError};
use crate::transcribe::SpeechRecord;

/// Append-only storage for speech records, keyed by movie.
///
/// `append` stores all records or none of them.
pub trait SpeechStore: Send + Sync {
    fn append(&self, movie_name: &str, records: &[SpeechRecord]) -> Result<()>;

    fn records_for(&self, movie_name: &str) -> Result<Vec<SpeechRecord>>;
}

#[derive(Default)]
pub struct MemorySpeechStore {
    records: Mutex<HashMap<String, Vec<SpeechRecord>>>,
}

impl MemorySpeechStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechStore for MemorySpeechStore {
    fn append(&self, movie_name: &str, records: &[SpeechRecord]) -> Result<()> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| BleepError::Processing("speech store lock poisoned".to_string()))?;
        guard
            .entry(movie_name.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }

    fn records_for(&self, movie_name: &str) -> Result<Vec<SpeechRecord>> {
        let guard = self
            .records
            .lock()
            .map_err(|_| BleepError::Processing("speech store lock poisoned".to_string()))?;
        Ok(guard.get(movie_name).cloned().unwrap_or_default())
    }
}

/// JSON file store. Every append rewrites the file through a temp file and a
/// rename, so a failed write leaves the previous content in place.
pub struct JsonSpeechStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonSpeechStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, Vec<SpeechRecord>>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, all: &HashMap<String, Vec<SpeechRecord>>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        temp.write_all(serde_json::to_string_pretty(all)?.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| BleepError::Io(e.error))?;
        Ok(())
    }
}

impl SpeechStore for JsonSpeechStore {
    fn append(&self, movie_name: &str, records: &[SpeechRecord]) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| BleepError::Processing("speech store lock poisoned".to_string()))?;

        let mut all = self.load()?;
        all.entry(movie_name.to_string())
            .or_default()
            .extend_from_slice(records);
        self.save(&all)?;

        debug!("Stored {} speech records for {}", records.len(), movie_name);
        info!("Speech results saved to {}", self.path.display());
        Ok(())
    }

    fn records_for(&self, movie_name: &str) -> Result<Vec<SpeechRecord>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| BleepError::Processing("speech store lock poisoned".to_string()))?;
        Ok(self.load()?.remove(movie_name).unwrap_or_default())
    }
}
