//! Custom-layout persistence.
//!
//! Customizations are stored per stream set: the key is the configured prefix
//! followed by the [`StreamSetSignature`] of the active streams, and the value
//! is the JSON-encoded [`CustomLayout`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    CustomLayoutStore                          │
//! │   - Derives the storage key from the active stream set        │
//! │   - Encodes/decodes the mapping as JSON                       │
//! │   - Drops entries for tiles that are no longer active         │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (testing, ephemeral)             │
//! │   - FileStorage: JSON file (requires state-persistence)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: [`CustomLayoutStore::load`] never fails; any
//!    storage or decode error is logged and an empty mapping is returned.
//! 2. **Atomic writes**: file storage uses the write-rename pattern.
//! 3. **Active set only**: loaded mappings never contain identities outside
//!    the active stream set.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | `load` logs and returns empty |
//! | `StorageError::Serialization` | Stored value is not a layout | `load` logs and returns empty |
//! | `StorageError::Corruption` | Lock poisoned | Returned from the backend call |
//! | `StorageError::Unavailable` | Layout file has another format version | Reads and writes refused; the file is left untouched |
//! | Missing entry | First use of this stream set | Empty mapping |

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::RwLock;

use multistream_layout::{CustomLayout, DEFAULT_STORAGE_KEY_PREFIX, Stream, StreamSetSignature};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during layout storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Storage is corrupted or in an invalid state.
    Corruption(String),
    /// Backend is not available.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_)
            | StorageError::Corruption(_)
            | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A string key-value store.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Value stored under `key`, or `None` on first use.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Every stored key, sorted.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.keys().cloned().collect())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk format.
    #[derive(Serialize, Deserialize)]
    struct StateFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Storage key -> JSON-encoded value.
        entries: BTreeMap<String, String>,
    }

    impl StateFile {
        const FORMAT_VERSION: u32 = 1;

        fn new(entries: BTreeMap<String, String>) -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries,
            }
        }
    }

    /// File-based storage backend using JSON.
    ///
    /// Every key lives in one file. Each `set`/`remove` rewrites the file with
    /// the write-rename pattern.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "multistream-custom-layout:k:beta,t:alpha": "{\"twitch:alpha:1\":{\"x\":0.0,\"y\":0.0,\"w\":400.0,\"h\":225.0}}"
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.json.tmp`
    /// 2. Flush and sync
    /// 3. Rename over `{path}`
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Create storage at the default location for the application.
        ///
        /// Uses `$XDG_STATE_HOME/multistream/{app_name}/layouts.json`, falling
        /// back to `~/.local/state`.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            let base = dirs_or_fallback();
            let path = base.join("multistream").join(app_name).join("layouts.json");
            Self { path }
        }

        /// Location of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
            if !self.path.exists() {
                return Ok(BTreeMap::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);

            // Version first: a newer layout may not decode as `StateFile`.
            let raw: serde_json::Value = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse layout file: {e}"))
            })?;
            let stored = raw.get("format_version").and_then(serde_json::Value::as_u64);
            if stored != Some(u64::from(StateFile::FORMAT_VERSION)) {
                tracing::warn!(
                    path = %self.path.display(),
                    stored = ?stored,
                    expected = StateFile::FORMAT_VERSION,
                    "layout file format version mismatch, refusing to read or overwrite it"
                );
                return Err(StorageError::Unavailable(format!(
                    "{} has format version {}, expected {}",
                    self.path.display(),
                    stored.map_or_else(|| "none".to_owned(), |v| v.to_string()),
                    StateFile::FORMAT_VERSION
                )));
            }

            let state_file: StateFile = serde_json::from_value(raw).map_err(|e| {
                StorageError::Serialization(format!("failed to parse layout file: {e}"))
            })?;

            Ok(state_file.entries)
        }

        fn write_entries(&self, entries: BTreeMap<String, String>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let count = entries.len();
            let state_file = StateFile::new(entries);
            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &state_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize layouts: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }

            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = count,
                "saved layout file"
            );
            Ok(())
        }
    }

    /// Get state directory, falling back to current dir if unavailable.
    fn dirs_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.read_entries()?.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut entries = self.read_entries()?;
            entries.insert(key.to_owned(), value.to_owned());
            self.write_entries(entries)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let mut entries = self.read_entries()?;
            if entries.remove(key).is_none() {
                return Ok(());
            }
            self.write_entries(entries)
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            Ok(self.read_entries()?.into_keys().collect())
        }

        fn is_available(&self) -> bool {
            if let Some(parent) = self.path.parent() {
                if !parent.exists() {
                    return fs::create_dir_all(parent).is_ok();
                }
                let test_path = parent.join(".multistream_test_write");
                if fs::write(&test_path, b"test").is_ok() {
                    let _ = fs::remove_file(&test_path);
                    return true;
                }
            }
            false
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Layout Store
// ─────────────────────────────────────────────────────────────────────────────

/// Per-stream-set persistence of [`CustomLayout`] mappings.
///
/// # Example
///
/// ```
/// use multistream_layout::{CustomLayout, Platform, Rect, Stream};
/// use multistream_runtime::state_persistence::CustomLayoutStore;
///
/// let store = CustomLayoutStore::in_memory();
/// let streams = [Stream::new(Platform::Twitch, "alpha", 1)];
///
/// let mut layout = CustomLayout::new();
/// layout.insert(streams[0].id.clone(), Rect::new(0.0, 0.0, 400.0, 225.0));
/// store.save(&streams, &layout).unwrap();
///
/// assert_eq!(store.load(&streams), layout);
/// ```
pub struct CustomLayoutStore {
    backend: Box<dyn StorageBackend>,
    prefix: String,
}

impl CustomLayoutStore {
    /// Create a store over `backend` using the default key prefix.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self::with_prefix(backend, DEFAULT_STORAGE_KEY_PREFIX)
    }

    /// Create a store over `backend` with a custom key prefix.
    #[must_use]
    pub fn with_prefix(backend: Box<dyn StorageBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    /// Create a store with memory storage (ephemeral, for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Create a store with file storage at the given path.
    #[cfg(feature = "state-persistence")]
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Box::new(FileStorage::new(path)))
    }

    /// Storage key for the given active streams.
    #[must_use]
    pub fn key_for(&self, streams: &[Stream]) -> String {
        StreamSetSignature::from_streams(streams).storage_key(&self.prefix)
    }

    /// Load the mapping for `streams`, surfacing errors.
    ///
    /// Entries for identities outside `streams` are dropped.
    pub fn try_load(&self, streams: &[Stream]) -> StorageResult<CustomLayout> {
        let key = self.key_for(streams);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(CustomLayout::new());
        };
        let mut layout: CustomLayout = serde_json::from_str(&raw).map_err(|e| {
            StorageError::Serialization(format!("failed to decode layout {key:?}: {e}"))
        })?;

        let active: HashSet<&str> = streams.iter().map(|s| s.id.as_str()).collect();
        let dropped = layout.retain_active(|id| active.contains(id.as_str()));
        tracing::debug!(
            backend = %self.backend.name(),
            key = %key,
            entries = layout.len(),
            dropped,
            "loaded custom layout"
        );
        Ok(layout)
    }

    /// Load the mapping for `streams`, falling back to an empty mapping on any
    /// error.
    #[must_use]
    pub fn load(&self, streams: &[Stream]) -> CustomLayout {
        match self.try_load(streams) {
            Ok(layout) => layout,
            Err(error) => {
                tracing::warn!(
                    backend = %self.backend.name(),
                    error = %error,
                    "failed to load custom layout, using grid placement"
                );
                CustomLayout::new()
            }
        }
    }

    /// Persist `layout` for `streams`.
    pub fn save(&self, streams: &[Stream], layout: &CustomLayout) -> StorageResult<()> {
        let key = self.key_for(streams);
        let raw = serde_json::to_string(layout).map_err(|e| {
            StorageError::Serialization(format!("failed to encode layout {key:?}: {e}"))
        })?;
        self.backend.set(&key, &raw)?;
        tracing::debug!(
            backend = %self.backend.name(),
            key = %key,
            entries = layout.len(),
            "saved custom layout"
        );
        Ok(())
    }

    /// Remove the stored mapping for `streams`.
    pub fn clear(&self, streams: &[Stream]) -> StorageResult<()> {
        self.backend.remove(&self.key_for(streams))
    }

    /// Every stored stream-set key.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(&self.prefix))
            .collect())
    }

    /// The key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the backend name for logging.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Check if the storage backend is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }
}

impl fmt::Debug for CustomLayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomLayoutStore")
            .field("backend", &self.backend.name())
            .field("prefix", &self.prefix)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────


#[cfg(all(test, feature = "state-persistence"))]
mod file_storage_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("layouts.json");
        let storage = FileStorage::new(&path);

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        assert!(path.exists());

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn file_storage_load_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("does_not_exist.json"));
        assert_eq!(storage.get("a").unwrap(), None);
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn file_storage_remove() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("layouts.json"));
        storage.set("a", "1").unwrap();
        storage.remove("a").unwrap();
        storage.remove("missing").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
    }

    #[test]
    fn file_storage_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dirs").join("layouts.json");
        let storage = FileStorage::new(&path);
        storage.set("k", "{}").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("layouts.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("a"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn file_storage_refuses_future_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("layouts.json");
        let newer = r#"{"format_version":99,"entries":{"a":{"nested":true}}}"#;
        std::fs::write(&path, newer).unwrap();
        let storage = FileStorage::new(&path);

        assert!(matches!(storage.get("a"), Err(StorageError::Unavailable(_))));
        assert!(matches!(storage.set("b", "2"), Err(StorageError::Unavailable(_))));
        assert!(matches!(storage.remove("a"), Err(StorageError::Unavailable(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), newer);
    }

    #[test]
    fn store_load_degrades_on_future_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("layouts.json");
        std::fs::write(&path, r#"{"format_version":2,"entries":{}}"#).unwrap();
        let streams = [multistream_layout::Stream::new(
            multistream_layout::Platform::Twitch,
            "alpha",
            1,
        )];
        assert!(CustomLayoutStore::with_file(&path).load(&streams).is_empty());
    }

    #[test]
    fn store_over_file_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("layouts.json");
        let streams = [multistream_layout::Stream::new(
            multistream_layout::Platform::Kick,
            "beta",
            7,
        )];
        let mut layout = CustomLayout::new();
        layout.insert(
            streams[0].id.clone(),
            multistream_layout::Rect::new(8.0, 8.0, 320.0, 180.0),
        );
        CustomLayoutStore::with_file(&path)
            .save(&streams, &layout)
            .unwrap();

        assert_eq!(CustomLayoutStore::with_file(&path).load(&streams), layout);
    }
}
