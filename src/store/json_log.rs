//! Append-only JSON array log
//!
//! The file is a single pretty-printed JSON array. Appends load the whole
//! array, push, and replace the file through a temp file + rename so a crash
//! mid-write leaves the previous version intact.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct JsonArrayLog {
    path: PathBuf,
}

impl JsonArrayLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the raw array.
    ///
    /// Missing or unreadable files, malformed JSON and non-array documents
    /// all come back as an empty array. Invalid UTF-8 is decoded lossily so a
    /// stray byte inside one payload does not discard the rest.
    pub fn load(&self) -> Vec<Value> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<Value>(&String::from_utf8_lossy(&bytes)) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                debug!("{} is not a JSON array, starting fresh", self.path.display());
                Vec::new()
            }
            Err(e) => {
                debug!("Ignoring malformed {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Decode every entry that matches `T`, in file order
    pub fn entries<T: DeserializeOwned>(&self) -> Vec<T> {
        self.load()
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one entry and rewrite the file. Returns the new length.
    pub fn append<T: Serialize>(&self, entry: &T) -> Result<usize> {
        let mut items = self.load();
        items.push(serde_json::to_value(entry).context("Failed to serialize log entry")?);

        let contents = serde_json::to_string_pretty(&items)
            .context("Failed to serialize log")?;
        atomic_write(&self.path, &contents)?;

        debug!("Appended entry {} to {}", items.len(), self.path.display());
        Ok(items.len())
    }
}

/// Write `contents` to a sibling temp file, then rename it over `path`
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension(format!("tmp.{}", std::process::id()));

    std::fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        n: u32,
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonArrayLog::new(dir.path().join("missing.json"));
        assert!(log.is_empty());
        assert!(log.entries::<Sample>().is_empty());
    }

    #[test]
    fn test_append_creates_pretty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        let log = JsonArrayLog::new(&path);

        assert_eq!(log.append(&Sample { n: 1 }).unwrap(), 1);
        assert_eq!(log.append(&Sample { n: 2 }).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[\n  {\n    \"n\": 1\n  },\n  {\n    \"n\": 2\n  }\n]");
        assert_eq!(log.entries::<Sample>(), vec![Sample { n: 1 }, Sample { n: 2 }]);
    }

    #[test]
    fn test_malformed_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "[{\"n\": 1},").unwrap();

        let log = JsonArrayLog::new(&path);
        assert!(log.is_empty());
        log.append(&Sample { n: 9 }).unwrap();
        assert_eq!(log.entries::<Sample>(), vec![Sample { n: 9 }]);
    }

    #[test]
    fn test_non_array_document_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "{\"n\": 1}").unwrap();

        let log = JsonArrayLog::new(&path);
        log.append(&Sample { n: 2 }).unwrap();
        assert_eq!(log.load(), vec![json!({"n": 2})]);
    }

    #[test]
    fn test_foreign_entries_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "[{\"legacy\": true}]").unwrap();

        let log = JsonArrayLog::new(&path);
        log.append(&Sample { n: 3 }).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.load()[0], json!({"legacy": true}));
        // Only the decodable entry comes back typed
        assert_eq!(log.entries::<Sample>(), vec![Sample { n: 3 }]);
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        atomic_write(&path, "{}").unwrap();
        atomic_write(&path, "{\"a\": 1}").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\": 1}");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1, "unexpected files: {:?}", names);
    }

    #[test]
    fn test_invalid_utf8_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, b"[{\"n\": 1}, {\"note\": \"caf\xe9\"}]").unwrap();

        let log = JsonArrayLog::new(&path);
        assert_eq!(log.len(), 2);
        assert_eq!(log.load()[1], json!({"note": "caf\u{fffd}"}));

        assert_eq!(log.append(&Sample { n: 2 }).unwrap(), 3);
        assert_eq!(log.entries::<Sample>(), vec![Sample { n: 1 }, Sample { n: 2 }]);
    }

    #[test]
    fn test_append_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonArrayLog::new(dir.path().join("nope").join("log.json"));
        assert!(log.append(&Sample { n: 1 }).is_err());
    }
}
