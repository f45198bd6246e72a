//! Bounded story history
//!
//! Keeps the last [`HISTORY_LIMIT`] generations, newest first, and mirrors
//! every change into a [`SnapshotStore`] under [`HISTORY_KEY`]. History is a
//! convenience: unreadable snapshots load as an empty list and failed writes
//! are logged, never surfaced.

pub mod backend;

pub use backend::{MemorySnapshotStore, SledSnapshotStore, SnapshotStore};

use crate::story::StoryResult;
use crate::themes::ThemeId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ulid::Ulid;

/// Storage key of the history snapshot
pub const HISTORY_KEY: &str = "microfavola_history";

/// Maximum number of entries kept
pub const HISTORY_LIMIT: usize = 10;

/// One past generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique, time-derived identifier (ULID)
    pub id: String,
    /// The user's original text
    pub input: String,
    /// Theme tag at generation time; may name a theme no longer in the catalog
    pub theme: String,
    /// The generated story
    pub story: StoryResult,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl HistoryEntry {
    /// Create an entry stamped with a fresh ULID and the current time
    pub fn new(story: StoryResult, input: impl Into<String>, theme: ThemeId) -> Self {
        Self {
            id: Ulid::new().to_string(),
            input: input.into(),
            theme: theme.as_str().to_string(),
            story,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// The entry's theme, if it is still in the catalog
    pub fn theme_id(&self) -> Option<ThemeId> {
        self.theme.parse().ok()
    }
}

/// Newest-first list of at most [`HISTORY_LIMIT`] entries
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")]
pub struct HistoryList {
    entries: Vec<HistoryEntry>,
}

impl From<Vec<HistoryEntry>> for HistoryList {
    fn from(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }
}

impl From<HistoryList> for Vec<HistoryEntry> {
    fn from(list: HistoryList) -> Self {
        list.entries
    }
}

impl HistoryList {
    /// Insert `entry` at the front, evicting the oldest beyond the limit
    pub fn push_front(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate newest first
    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }
}

/// Owner of the in-memory history and its persisted snapshot
pub struct HistoryStore {
    list: HistoryList,
    backend: Arc<dyn SnapshotStore>,
}

impl HistoryStore {
    /// Load the persisted snapshot
    ///
    /// Absent, unreadable or corrupt snapshots yield an empty history.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use microfavola::history::{HistoryStore, MemorySnapshotStore};
    ///
    /// let store = HistoryStore::load(Arc::new(MemorySnapshotStore::new()));
    /// assert!(store.is_empty());
    /// ```
    pub fn load(backend: Arc<dyn SnapshotStore>) -> Self {
        let list = match backend.read(HISTORY_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<HistoryList>(&bytes) {
                Ok(list) => {
                    tracing::debug!("Loaded {} history entries", list.len());
                    list
                }
                Err(e) => {
                    tracing::warn!("Failed to load history, starting empty: {}", e);
                    HistoryList::default()
                }
            },
            Ok(None) => HistoryList::default(),
            Err(e) => {
                tracing::warn!("Failed to read history snapshot, starting empty: {}", e);
                HistoryList::default()
            }
        };

        Self { list, backend }
    }

    /// Record a successful generation and persist the updated list
    ///
    /// Returns the updated list so callers can refresh their view.
    pub fn record(&mut self, result: StoryResult, input: &str, theme: ThemeId) -> &HistoryList {
        let entry = HistoryEntry::new(result, input, theme);
        tracing::debug!(id = %entry.id, theme = %entry.theme, "Recording history entry");
        self.list.push_front(entry);
        self.persist();
        &self.list
    }

    /// Empty the history and remove the persisted snapshot
    pub fn clear(&mut self) {
        self.list = HistoryList::default();
        if let Err(e) = self.backend.remove(HISTORY_KEY) {
            tracing::warn!("Failed to remove history snapshot: {}", e);
        }
    }

    /// The current list
    pub fn list(&self) -> &HistoryList {
        &self.list
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        self.list.entries()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Find an entry by identifier
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.list.iter().find(|e| e.id == id)
    }

    /// Entry at `index` (0 is the newest)
    pub fn get_index(&self, index: usize) -> Option<&HistoryEntry> {
        self.list.entries().get(index)
    }

    fn persist(&self) {
        let bytes = match serde_json::to_vec(&self.list) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to serialize history: {}", e);
                return;
            }
        };

        if let Err(e) = self.backend.write(HISTORY_KEY, &bytes) {
            tracing::warn!("Failed to persist history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MicrofavolaError, Result};

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn read(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(MicrofavolaError::Storage("read failed".to_string()).into())
        }
        fn write(&self, _key: &str, _value: &[u8]) -> Result<()> {
            Err(MicrofavolaError::Storage("write failed".to_string()).into())
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(MicrofavolaError::Storage("remove failed".to_string()).into())
        }
    }

    fn story(n: usize) -> StoryResult {
        StoryResult::new(format!("Titolo {}", n), "Corpo", "Colpo di scena")
    }

    fn persisted(backend: &MemorySnapshotStore) -> Option<Vec<HistoryEntry>> {
        backend
            .read(HISTORY_KEY)
            .unwrap()
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let store = HistoryStore::load(Arc::new(MemorySnapshotStore::new()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_snapshot_is_empty() {
        let backend = Arc::new(MemorySnapshotStore::new());
        backend.write(HISTORY_KEY, b"{not json").unwrap();
        let store = HistoryStore::load(backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_read_failure_is_empty() {
        let store = HistoryStore::load(Arc::new(FailingStore));
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_prepends_and_persists() {
        let backend = Arc::new(MemorySnapshotStore::new());
        let mut store = HistoryStore::load(backend.clone());

        store.record(story(1), "primo", ThemeId::Noir);
        let list = store.record(story(2), "secondo", ThemeId::Horror);

        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].input, "secondo");
        assert_eq!(list.entries()[0].theme, "horror");
        assert_eq!(list.entries()[1].input, "primo");
        assert_eq!(persisted(&backend).unwrap(), store.entries().to_vec());
    }

    #[test]
    fn test_record_returns_the_stored_list() {
        let mut store = HistoryStore::load(Arc::new(MemorySnapshotStore::new()));
        store.record(story(1), "primo", ThemeId::Noir);

        let returned = store.record(story(2), "secondo", ThemeId::Fantasy).clone();

        assert_eq!(&returned, store.list());
        assert_eq!(returned.entries()[0].theme, "fantasy");
    }

    #[test]
    fn test_length_is_min_of_n_and_limit() {
        let backend = Arc::new(MemorySnapshotStore::new());
        let mut store = HistoryStore::load(backend.clone());

        for n in 1..=15 {
            let list = store.record(story(n), &format!("input {}", n), ThemeId::Poetico);
            assert_eq!(list.len(), n.min(HISTORY_LIMIT));
            assert_eq!(list.entries()[0].story.title, format!("Titolo {}", n));
        }
        assert_eq!(persisted(&backend).unwrap().len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_eleventh_entry_evicts_oldest() {
        let mut store = HistoryStore::load(Arc::new(MemorySnapshotStore::new()));
        for n in 1..=10 {
            store.record(story(n), &format!("input {}", n), ThemeId::Ironico);
        }
        let oldest_id = store.entries()[9].id.clone();

        store.record(story(11), "input 11", ThemeId::Ironico);

        assert_eq!(store.len(), 10);
        assert!(store.get(&oldest_id).is_none());
        assert_eq!(store.entries()[0].input, "input 11");
    }

    #[test]
    fn test_clear_empties_and_removes_snapshot() {
        let backend = Arc::new(MemorySnapshotStore::new());
        let mut store = HistoryStore::load(backend.clone());
        store.record(story(1), "x", ThemeId::Noir);

        store.clear();

        assert!(store.is_empty());
        assert!(persisted(&backend).is_none());
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let mut store = HistoryStore::load(Arc::new(FailingStore));
        let list = store.record(story(1), "x", ThemeId::Noir);
        assert_eq!(list.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip_reload_yields_equal_list() {
        let backend = Arc::new(MemorySnapshotStore::new());
        let mut store = HistoryStore::load(backend.clone());
        for n in 1..=3 {
            store.record(story(n), &format!("input {}", n), ThemeId::Fantasy);
        }

        let reloaded = HistoryStore::load(backend);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_oversized_snapshot_is_truncated_on_load() {
        let entries: Vec<HistoryEntry> = (0..12)
            .map(|n| HistoryEntry::new(story(n), format!("input {}", n), ThemeId::Noir))
            .collect();
        let backend = Arc::new(MemorySnapshotStore::new());
        backend
            .write(HISTORY_KEY, &serde_json::to_vec(&entries).unwrap())
            .unwrap();

        let store = HistoryStore::load(backend);
        assert_eq!(store.len(), HISTORY_LIMIT);
        assert_eq!(store.entries()[0].input, "input 0");
    }

    #[test]
    fn test_snapshot_format_matches_reference_shape() {
        let json = r#"[{"id":"1730000000000","input":"un orologio rotto","theme":"poetico",
            "story":{"title":"T","content":"C","twist":"X"},"timestamp":1730000000000}]"#;
        let list: HistoryList = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 1);
        let entry = &list.entries()[0];
        assert_eq!(entry.theme_id(), Some(ThemeId::Poetico));
        assert_eq!(entry.timestamp, 1_730_000_000_000);
    }

    #[test]
    fn test_unknown_theme_in_snapshot_is_tolerated() {
        let json = r#"[{"id":"a","input":"x","theme":"western",
            "story":{"title":"T","content":"C","twist":"X"},"timestamp":1}]"#;
        let list: HistoryList = serde_json::from_str(json).unwrap();
        assert_eq!(list.entries()[0].theme_id(), None);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = HistoryEntry::new(story(1), "x", ThemeId::Noir);
        let b = HistoryEntry::new(story(1), "x", ThemeId::Noir);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 26);
    }
}
