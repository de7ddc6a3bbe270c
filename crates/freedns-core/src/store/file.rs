// # File Entry Store
//
// File-based implementation of EntryStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "next_id": 2,
//   "entries": {
//     "entry-1": {
//       "id": "entry-1",
//       "title": "FreeDNS",
//       "options": { "access_token": "...", "scan_interval_mins": 10, "timeout_secs": 10 },
//       "created_at": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::ListenerSet;
use crate::Error;
use crate::config::{ConfigEntry, EntryId, EntryOptions};
use crate::traits::entry_store::{EntryStore, UpdateListener};
use crate::traits::scheduler::CancelHandle;

/// Entry file format version
/// Used for future migration if format changes
const ENTRY_FILE_VERSION: &str = "1.0";

/// Serializable entry file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct EntryFileFormat {
    version: String,
    #[serde(default = "default_next_id")]
    next_id: u64,
    entries: HashMap<EntryId, ConfigEntry>,
}

fn default_next_id() -> u64 {
    1
}

/// File-based entry store with crash recovery
///
/// Persists entries to a JSON file with atomic writes and automatic
/// corruption recovery. Every mutation is written through immediately.
///
/// # Crash Recovery
///
/// - **Atomic writes**: New state written to temporary file, then renamed
/// - **Backup**: Last known good state kept in `.backup` file
/// - **Corruption detection**: JSON validation on load
/// - **Automatic recovery**: Falls back to backup if main file corrupted
///
/// # Example
///
/// ```rust,no_run
/// use freedns_core::EntryOptions;
/// use freedns_core::store::FileEntryStore;
/// use freedns_core::traits::EntryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileEntryStore::new("/var/lib/freedns/entries.json").await?;
///
///     let entry = store
///         .create("FreeDNS", EntryOptions::new().with_access_token("tok123"))
///         .await?;
///     assert_eq!(store.get(&entry.id).await?.map(|e| e.id), Some(entry.id));
///
///     Ok(())
/// }
/// ```
pub struct FileEntryStore {
    path: PathBuf,
    entries: RwLock<HashMap<EntryId, ConfigEntry>>,
    listeners: ListenerSet,
    next_id: AtomicU64,
}

impl FileEntryStore {
    /// Create or load a file entry store
    ///
    /// This will:
    /// 1. Try to load the existing entry file
    /// 2. If corruption is detected, try to load from backup
    /// 3. If both fail, start with no entries
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create entry store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let loaded = Self::load_with_recovery(&path).await?;
        let next_id = initial_next_id(&loaded);

        Ok(Self {
            path,
            entries: RwLock::new(loaded.entries),
            listeners: ListenerSet::new(),
            next_id: AtomicU64::new(next_id),
        })
    }

    /// Load entries from file with automatic recovery
    ///
    /// Recovery strategy:
    /// 1. Try to load the main entry file
    /// 2. On a JSON parse error, try loading the backup
    /// 3. If the backup also fails, start with no entries
    async fn load_with_recovery(path: &Path) -> Result<EntryFileFormat, Error> {
        match Self::load_file(path).await {
            Ok(format) => {
                tracing::debug!("Loaded entry file: {} entries", format.entries.len());
                Ok(format)
            }
            Err(err @ Error::Json(_)) => {
                tracing::warn!(
                    "Entry file appears corrupted: {}. Attempting recovery from backup.",
                    err
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with no entries.");
                    return Ok(empty_format());
                }

                match Self::load_file(&backup_path).await {
                    Ok(format) => {
                        tracing::info!(
                            "Recovered entries from backup: {} entries",
                            format.entries.len()
                        );
                        if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await
                        {
                            tracing::error!(
                                "Failed to restore entry file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(format)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with no entries.",
                            backup_err
                        );
                        Ok(empty_format())
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Load entries from one file
    async fn load_file(path: &Path) -> Result<EntryFileFormat, Error> {
        if !path.exists() {
            tracing::debug!("Entry file does not exist: {}", path.display());
            return Ok(empty_format());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store(format!(
                "Failed to read entry file {}: {}",
                path.display(),
                e
            ))
        })?;

        let format: EntryFileFormat = serde_json::from_str(&content)?;

        if format.version != ENTRY_FILE_VERSION {
            tracing::warn!(
                "Entry file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                ENTRY_FILE_VERSION,
                format.version
            );
        }

        Ok(format)
    }

    /// Write entries to file atomically
    async fn write_entries(&self) -> Result<(), Error> {
        let format = {
            let entries = self.entries.read().await;
            EntryFileFormat {
                version: ENTRY_FILE_VERSION.to_string(),
                next_id: self.next_id.load(Ordering::SeqCst),
                entries: entries.clone(),
            }
        };

        let json = serde_json::to_string_pretty(&format)?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Create backup of current file (if it exists)
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Entries written to file: {}", self.path.display());
        Ok(())
    }

    /// Restore the entry file from backup
    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await.map_err(|e| {
            Error::store(format!(
                "Failed to restore from backup {} to {}: {}",
                backup_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!("Restored entry file from backup");
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Force an immediate write to disk
    pub async fn sync(&self) -> Result<(), Error> {
        self.write_entries().await
    }

    fn assign_id(&self) -> EntryId {
        EntryId::new(format!("entry-{}", self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

/// Next identifier to hand out for a freshly loaded file
///
/// Prefers the persisted counter but never re-issues an identifier that
/// already appears among the entries.
fn initial_next_id(format: &EntryFileFormat) -> u64 {
    let max_seen = format
        .entries
        .keys()
        .filter_map(|id| id.as_str().strip_prefix("entry-"))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format.next_id.max(max_seen + 1)
}

fn empty_format() -> EntryFileFormat {
    EntryFileFormat {
        version: ENTRY_FILE_VERSION.to_string(),
        next_id: 1,
        entries: HashMap::new(),
    }
}

#[async_trait]
impl EntryStore for FileEntryStore {
    async fn get(&self, entry_id: &EntryId) -> Result<Option<ConfigEntry>, Error> {
        Ok(self.entries.read().await.get(entry_id).cloned())
    }

    async fn list(&self) -> Result<Vec<ConfigEntry>, Error> {
        let mut entries: Vec<ConfigEntry> = self.entries.read().await.values().cloned().collect();
        entries.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(entries)
    }

    async fn create(&self, title: &str, options: EntryOptions) -> Result<ConfigEntry, Error> {
        let entry = ConfigEntry {
            id: self.assign_id(),
            title: title.to_string(),
            options,
            created_at: Utc::now(),
        };
        self.entries
            .write()
            .await
            .insert(entry.id.clone(), entry.clone());

        self.write_entries().await?;
        Ok(entry)
    }

    async fn replace_options(
        &self,
        entry_id: &EntryId,
        options: EntryOptions,
    ) -> Result<ConfigEntry, Error> {
        let updated = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .get_mut(entry_id)
                .ok_or_else(|| Error::not_found(entry_id.to_string()))?;
            entry.options = options;
            entry.clone()
        };

        // Persist first; listeners only ever observe committed state.
        self.write_entries().await?;
        for listener in self.listeners.watching(entry_id) {
            listener(updated.clone()).await;
        }
        Ok(updated)
    }

    fn add_update_listener(&self, entry_id: &EntryId, listener: UpdateListener) -> CancelHandle {
        self.listeners.add(entry_id, listener)
    }
}
