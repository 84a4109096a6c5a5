//! File-backed per-user chat history.
//!
//! The store is loaded once at startup and rewritten in full after every
//! mutation. Correctness here favors availability: a missing or corrupt
//! file degrades to "no memory" instead of stopping the bot.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the backing file, placed next to the running executable.
pub const HISTORY_FILE_NAME: &str = "chat_history.json";

/// One persisted message with the metadata needed to rebuild context later.
///
/// Field names match the on-disk JSON exactly. Records are append-only:
/// once written they are never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message: String,
    pub timestamp: String,
    pub user_name: String,
    pub user_id: String,
    pub bot_id: String,
    pub bot_name: String,
}

/// Default location of the history file: beside the executable, falling
/// back to the working directory if the executable path is unavailable.
#[must_use]
pub fn default_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map_or_else(
            || PathBuf::from(HISTORY_FILE_NAME),
            |dir| dir.join(HISTORY_FILE_NAME),
        )
}

/// Mapping from user id to that user's ordered message records.
///
/// The in-memory shape is raw JSON so that malformed record entries found
/// in the file pass through load/save untouched; they are skipped when
/// read, not repaired in place.
pub struct HistoryStore {
    path: PathBuf,
    history: Map<String, Value>,
}

impl HistoryStore {
    /// Load the history from `path`.
    ///
    /// A missing, empty, or unparseable file yields an empty store; parse
    /// failures are logged, never fatal. Top-level values that are not
    /// arrays are discarded.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let history = match fs::read_to_string(&path) {
            Ok(contents) => parse_history(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history file at {}, starting empty", path.display());
                Map::new()
            }
            Err(e) => {
                error!("Error loading chat history from {}: {}", path.display(), e);
                Map::new()
            }
        };

        debug!("Loaded history for {} users", history.len());
        Self { path, history }
    }

    /// Append `record` to `user_id`'s history.
    ///
    /// A slot holding anything other than an array is reset to empty first.
    /// The caller is responsible for persisting afterward via [`save`].
    ///
    /// [`save`]: HistoryStore::save
    pub fn append(&mut self, user_id: &str, record: MessageRecord) {
        let entry = match serde_json::to_value(&record) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize history record: {}", e);
                return;
            }
        };

        let slot = self
            .history
            .entry(user_id.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            warn!("Resetting malformed history for user {}", user_id);
            *slot = Value::Array(Vec::new());
        }
        if let Some(records) = slot.as_array_mut() {
            records.push(entry);
        }
    }

    /// Rewrite the backing file with the full mapping.
    ///
    /// Non-ASCII text is written verbatim. A write failure is logged and
    /// swallowed; the in-memory state stays authoritative until the next
    /// successful save.
    pub fn save(&self) {
        match serde_json::to_string_pretty(&self.history) {
            Ok(serialized) => {
                if let Err(e) = fs::write(&self.path, serialized) {
                    error!("Error saving chat history to {}: {}", self.path.display(), e);
                }
            }
            Err(e) => error!("Error serializing chat history: {}", e),
        }
    }

    /// The `message` text of every well-formed record for `user_id`, in
    /// stored order. Entries that are not objects with a string `message`
    /// field are skipped.
    #[must_use]
    pub fn messages_for(&self, user_id: &str) -> Vec<String> {
        self.history
            .get(user_id)
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| {
                        record
                            .get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_history(contents: &str) -> Map<String, Value> {
    if contents.trim().is_empty() {
        return Map::new();
    }

    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(mut map)) => {
            map.retain(|user_id, value| {
                if value.is_array() {
                    true
                } else {
                    warn!("Discarding malformed history for user {}", user_id);
                    false
                }
            });
            map
        }
        Ok(_) => {
            error!("History file is not a JSON object, starting empty");
            Map::new()
        }
        Err(e) => {
            error!("JSON decode error, history file might be corrupted: {}", e);
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(message: &str) -> MessageRecord {
        MessageRecord {
            message: message.to_string(),
            timestamp: "2024-06-01T12:00:00+00:00".to_string(),
            user_name: "foxfan#1234".to_string(),
            user_id: "42".to_string(),
            bot_id: "99".to_string(),
            bot_name: "foxchat".to_string(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::load(dir.path().join(HISTORY_FILE_NAME))
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.history.is_empty());
    }

    #[test]
    fn empty_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(&path, "").unwrap();
        let store = HistoryStore::load(path);
        assert!(store.history.is_empty());
    }

    #[test]
    fn malformed_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(&path, "{not json at all").unwrap();
        let store = HistoryStore::load(path);
        assert!(store.history.is_empty());
    }

    #[test]
    fn non_object_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(&path, "[1, 2, 3]").unwrap();
        let store = HistoryStore::load(path);
        assert!(store.history.is_empty());
    }

    #[test]
    fn load_discards_non_array_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(
            &path,
            r#"{"42": [{"message": "hi"}], "43": "not a list"}"#,
        )
        .unwrap();
        let store = HistoryStore::load(path);
        assert!(store.history.contains_key("42"));
        assert!(!store.history.contains_key("43"));
    }

    #[test]
    fn append_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.append("42", record("first"));
        store.append("42", record("second"));
        store.append("42", record("third"));
        assert_eq!(store.messages_for("42"), ["first", "second", "third"]);
    }

    #[test]
    fn append_resets_malformed_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store
            .history
            .insert("42".to_string(), json!("not a list"));
        store.append("42", record("fresh start"));
        assert_eq!(store.messages_for("42"), ["fresh start"]);
    }

    #[test]
    fn save_and_load_round_trips_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        let mut store = HistoryStore::load(path.clone());
        store.append("42", record("café 🦊"));
        store.save();

        // The file must hold the text verbatim, not escaped.
        let on_disk = fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("café 🦊"));

        let reloaded = HistoryStore::load(path);
        assert_eq!(reloaded.messages_for("42"), ["café 🦊"]);
    }

    #[test]
    fn save_failure_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::load(dir.path().join("no/such/dir/history.json"));
        store.append("42", record("hi"));
        store.save();
        assert_eq!(store.messages_for("42"), ["hi"]);
    }

    #[test]
    fn messages_skip_malformed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(
            &path,
            r#"{"42": [{"message": "hi"}, "junk", {"other": 1}, {"message": "bye"}]}"#,
        )
        .unwrap();
        let store = HistoryStore::load(path);
        assert_eq!(store.messages_for("42"), ["hi", "bye"]);
    }

    #[test]
    fn messages_for_unknown_user_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.messages_for("nobody").is_empty());
    }
}
