//! JSON-file record store.
//!
//! The whole collection lives in one pretty-printed JSON array. Every call
//! goes back to the file; nothing is cached between requests. Elements are
//! kept as raw JSON values, so entries written by older front ends or edited
//! by hand survive every rewrite unchanged, whatever their shape.
//!
//! Writes are serialized through a single async mutex so that two concurrent
//! submissions can never both read the same collection and overwrite each
//! other. Each write lands in a temp file next to the target and is renamed
//! over it, so readers (which do not lock) always see a complete document.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::record::Record;

/// Content of a freshly created data file.
const EMPTY_DOCUMENT: &[u8] = b"[]\n";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record file i/o: {0}")]
    Io(#[from] io::Error),

    #[error("record encoding: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("record writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The check-in collection, backed by one file.
pub struct RecordStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), writer: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Reads the full collection, creating an empty one on first use.
    ///
    /// Content that is not JSON, or JSON that is not an array, loads as an
    /// empty collection; the next append will replace it. Any array is
    /// accepted as-is.
    pub async fn load(&self) -> Result<Vec<Value>, StoreError> {
        self.ensure().await?;
        self.read().await
    }

    /// Replaces the whole collection with `records`.
    pub async fn save(&self, records: &[Value]) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        self.write(records).await
    }

    /// Appends one record and returns the new collection length.
    pub async fn append(&self, record: &Record) -> Result<usize, StoreError> {
        let entry = record.to_value()?;
        let _guard = self.writer.lock().await;
        self.create_if_missing().await?;

        let mut records = self.read().await?;
        records.push(entry);
        self.write(&records).await?;

        debug!(path = %self.path.display(), total = records.len(), "record appended");
        Ok(records.len())
    }

    async fn ensure(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        let _guard = self.writer.lock().await;
        self.create_if_missing().await
    }

    /// Caller must hold `writer`.
    async fn create_if_missing(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        debug!(path = %self.path.display(), "creating empty record file");
        replace_file(self.path.clone(), EMPTY_DOCUMENT.to_vec()).await
    }

    async fn read(&self) -> Result<Vec<Value>, StoreError> {
        let raw = tokio::fs::read(&self.path).await?;
        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(other) => {
                warn!(path = %self.path.display(), kind = json_kind(&other), "record file is not a JSON array, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(path = %self.path.display(), "record file is not valid JSON, treating as empty: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Caller must hold `writer`.
    async fn write(&self, records: &[Value]) -> Result<(), StoreError> {
        let mut document = serde_json::to_vec_pretty(records)?;
        document.push(b'\n');
        replace_file(self.path.clone(), document).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Writes `content` to a temp file in the target's directory and renames it
/// over `path`.
async fn replace_file(path: PathBuf, content: Vec<u8>) -> Result<(), StoreError> {
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(&content)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(code: &str, name: &str) -> Record {
        Record::new(code, name, "2026-10-19T12:00:00.000Z", "19/10/2026, 07:00:00")
    }

    fn entry(code: &str, name: &str) -> Value {
        record(code, name).to_value().unwrap()
    }

    #[tokio::test]
    async fn load_on_missing_file_creates_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registro.json");
        let store = RecordStore::new(&path);

        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), b"[]\n");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("registro.json"));
        let records = vec![entry("1234", "Ana"), entry("1234", "Ana"), entry("98765", "Bruno")];

        store.save(&records).await.unwrap();
        assert_eq!(store.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn document_is_pretty_printed_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registro.json");
        let store = RecordStore::new(&path);
        store.append(&record("1234", "Ana")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"codigo\": \"1234\""));
        assert!(raw.ends_with("]\n"));
    }

    #[tokio::test]
    async fn non_json_or_non_array_content_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registro.json");
        let store = RecordStore::new(&path);

        for content in ["", "{not json", "[1, 2", "{\"codigo\":\"1234\"}", "null", "\"[]\""] {
            std::fs::write(&path, content).unwrap();
            assert!(store.load().await.unwrap().is_empty(), "content {content:?}");
        }
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("registro.json"));

        assert_eq!(store.append(&record("1111", "Ana")).await.unwrap(), 1);
        assert_eq!(store.append(&record("2222", "Bruno")).await.unwrap(), 2);

        let codes: Vec<_> = store.load().await.unwrap().into_iter().map(|r| r["codigo"].clone()).collect();
        assert_eq!(codes, ["1111", "2222"]);
    }

    #[tokio::test]
    async fn any_array_is_history_and_survives_an_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registro.json");
        let history = serde_json::json!([
            { "codigo": "1234", "nombre": "Ana", "fechaISO": 1700000000000_u64, "fechaLocal": "14/11/2023" },
            { "nombre": "Luis", "codigo": 5678, "grupo": "B" },
            null,
            7,
            "suelto",
        ]);
        std::fs::write(&path, serde_json::to_vec(&history).unwrap()).unwrap();
        let store = RecordStore::new(&path);

        assert_eq!(store.load().await.unwrap().len(), 5);
        assert_eq!(store.append(&record("9999", "Eva")).await.unwrap(), 6);

        let stored: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let stored = stored.as_array().unwrap();
        assert_eq!(stored[..5], history.as_array().unwrap()[..]);
        assert_eq!(stored[5], entry("9999", "Eva"));

        let keys: Vec<_> = stored[1].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["nombre", "codigo", "grupo"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordStore::new(dir.path().join("registro.json")));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..40 {
            let store = Arc::clone(&store);
            tasks.spawn(async move { store.append(&record(&format!("{:04}", 1000 + i), "Ana")).await });
        }
        while let Some(res) = tasks.join_next().await {
            res.unwrap().unwrap();
        }

        assert_eq!(store.load().await.unwrap().len(), 40);
    }

    #[tokio::test]
    async fn unwritable_location_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("missing-dir").join("registro.json"));
        assert!(matches!(store.append(&record("1234", "Ana")).await, Err(StoreError::Io(_))));
    }
}
