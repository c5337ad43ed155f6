//! Selecting and opening the capacity store a command runs against.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use medroute_core::{CapacityStore, Facility, MemoryCapacityStore};
use medroute_fs::{FileLock, is_regular_file, lock_exclusive, read_utf8, write_atomically};

use crate::{ARG_DATABASE, ARG_SNAPSHOT, CliError};

/// Where facility records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreSource {
    /// A JSON array of facilities, held in memory while the command runs.
    Snapshot(Utf8PathBuf),
    /// A SQLite database created by `medroute import`.
    Database(Utf8PathBuf),
}

impl StoreSource {
    /// Pick the store from the merged `--snapshot` and `--database` options.
    pub(crate) fn choose(
        snapshot: Option<Utf8PathBuf>,
        database: Option<Utf8PathBuf>,
        env: &'static str,
    ) -> Result<Self, CliError> {
        match (snapshot, database) {
            (Some(_), Some(_)) => Err(CliError::ConflictingStores),
            (Some(path), None) => Ok(Self::Snapshot(path)),
            (None, Some(path)) => Ok(Self::Database(path)),
            (None, None) => Err(CliError::MissingArgument {
                field: ARG_SNAPSHOT,
                env,
            }),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CliError> {
        match self {
            Self::Snapshot(path) => require_existing(path, ARG_SNAPSHOT),
            Self::Database(path) => require_existing(path, ARG_DATABASE),
        }
    }

    /// Open the store for reading.
    pub(crate) fn open(&self) -> Result<OpenedStore, CliError> {
        match self {
            Self::Snapshot(path) => open_snapshot(path, None),
            Self::Database(path) => open_database(path),
        }
    }

    /// Open the store for a read-modify-write cycle.
    ///
    /// Snapshots are locked before they are read and stay locked until the
    /// returned store is dropped, so concurrent runs claim in turn instead
    /// of overwriting each other's claims.
    pub(crate) fn open_exclusive(&self) -> Result<OpenedStore, CliError> {
        match self {
            Self::Snapshot(path) => {
                let lock = lock_exclusive(path).map_err(|source| CliError::LockSnapshot {
                    path: path.clone(),
                    source,
                })?;
                open_snapshot(path, Some(lock))
            }
            Self::Database(path) => open_database(path),
        }
    }
}

fn open_snapshot(path: &Utf8Path, lock: Option<FileLock>) -> Result<OpenedStore, CliError> {
    let facilities = load_snapshot(path)?;
    let store = MemoryCapacityStore::with_facilities(facilities).map_err(|source| {
        CliError::InvalidSnapshot {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!("loaded {} facilities from {path}", store.len());
    Ok(OpenedStore {
        store: Arc::new(store),
        write_back: Some(path.to_path_buf()),
        _lock: lock,
    })
}

#[cfg(feature = "store-sqlite")]
fn open_database(path: &Utf8Path) -> Result<OpenedStore, CliError> {
    let store = medroute_core::SqliteCapacityStore::open(path.as_std_path())?;
    Ok(OpenedStore {
        store: Arc::new(store),
        write_back: None,
        _lock: None,
    })
}

#[cfg(not(feature = "store-sqlite"))]
fn open_database(_path: &Utf8Path) -> Result<OpenedStore, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "opening a capacity database",
    })
}

/// A store ready for use, plus where to persist it afterwards.
///
/// Database stores commit as they go. Snapshot stores live in memory and
/// must be written back for a claim to outlast the process.
pub(crate) struct OpenedStore {
    pub(crate) store: Arc<dyn CapacityStore>,
    write_back: Option<Utf8PathBuf>,
    _lock: Option<FileLock>,
}

impl OpenedStore {
    pub(crate) fn persist(&self) -> Result<(), CliError> {
        let Some(path) = &self.write_back else {
            return Ok(());
        };
        let facilities = self.store.all()?;
        save_snapshot(path, &facilities)
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match is_regular_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads a JSON array of [`Facility`] records from disk.
pub(crate) fn load_snapshot(path: &Utf8Path) -> Result<Vec<Facility>, CliError> {
    let contents = read_utf8(path).map_err(|source| CliError::OpenSnapshot {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ParseSnapshot {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn save_snapshot(path: &Utf8Path, facilities: &[Facility]) -> Result<(), CliError> {
    let payload = serde_json::to_vec_pretty(facilities).map_err(CliError::SerialiseOutput)?;
    write_atomically(path, &payload).map_err(|source| CliError::WriteSnapshot {
        path: path.to_path_buf(),
        source,
    })
}
