//! SQLite-backed capacity store.
//!
//! Availability lives in a `capacities` table guarded by
//! `CHECK (available BETWEEN 0 AND total)`. The conditional decrement is a
//! single `UPDATE … WHERE available > 0`, so the database itself refuses to
//! oversell even if several processes share the file.

use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use geo::Coord;
use log::{debug, warn};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use thiserror::Error;

use crate::{
    BedCapacity, Capacity, CapacityError, DailySample, Facility, FacilityId, HistoryWindow,
    LiveUpdate, LiveValue, ParseCategoryError, ResourceCategory,
};

use super::{CapacityStore, StoreError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS facilities (
        id                TEXT PRIMARY KEY,
        name              TEXT NOT NULL,
        city              TEXT NOT NULL,
        lng               REAL NOT NULL,
        lat               REAL NOT NULL,
        oxygen_percentage INTEGER CHECK (oxygen_percentage BETWEEN 0 AND 100),
        last_updated      TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS capacities (
        facility_id TEXT NOT NULL REFERENCES facilities(id),
        category    TEXT NOT NULL,
        total       INTEGER NOT NULL CHECK (total >= 0),
        available   INTEGER CHECK (available BETWEEN 0 AND total),
        PRIMARY KEY (facility_id, category)
    );
    CREATE TABLE IF NOT EXISTS history (
        facility_id       TEXT NOT NULL REFERENCES facilities(id),
        day               TEXT NOT NULL,
        icu_available     INTEGER,
        general_available INTEGER,
        oxygen_percentage INTEGER,
        PRIMARY KEY (facility_id, day)
    );
";

const DECREMENT: &str = "
    UPDATE capacities
       SET available = available - 1
     WHERE facility_id = ?1 AND category = ?2 AND available > 0
 RETURNING available";

/// Error raised when opening, importing or reading the SQLite database.
#[derive(Debug, Error)]
pub enum SqliteCapacityStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored category name is not recognised.
    #[error("facility {facility_id} has an unreadable capacity row: {source}")]
    InvalidCategory {
        /// Facility owning the row.
        facility_id: String,
        /// Parse failure.
        #[source]
        source: ParseCategoryError,
    },
    /// A facility offered for import breaks the capacity invariant.
    #[error("facility {facility_id} cannot be imported: {source}")]
    InvalidFacility {
        /// Facility that failed validation.
        facility_id: String,
        /// The violated constraint.
        #[source]
        source: CapacityError,
    },
    /// Generic SQLite error.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Capacity store persisted in a SQLite database.
pub struct SqliteCapacityStore {
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteCapacityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCapacityStore").finish_non_exhaustive()
    }
}

impl SqliteCapacityStore {
    /// Open or create a database at `path` and ensure the schema exists.
    pub fn open<P>(path: P) -> Result<Self, SqliteCapacityStoreError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteCapacityStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SqliteCapacityStoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteCapacityStoreError> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Insert or replace facilities, including their history.
    ///
    /// The import is one transaction: either every facility is written or
    /// none is. Returns the number of facilities written.
    pub fn import<'a, I>(&self, facilities: I) -> Result<usize, SqliteCapacityStoreError>
    where
        I: IntoIterator<Item = &'a Facility>,
    {
        let mut connection = self.connection.lock();
        let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut written = 0;
        let mut seen = BTreeSet::new();
        for facility in facilities {
            facility
                .validate()
                .and_then(|()| {
                    if seen.insert(&facility.id) {
                        Ok(())
                    } else {
                        Err(CapacityError::DuplicateId)
                    }
                })
                .map_err(|source| SqliteCapacityStoreError::InvalidFacility {
                    facility_id: facility.id.to_string(),
                    source,
                })?;
            write_facility(&tx, facility)?;
            written += 1;
        }
        tx.commit()?;
        debug!("imported {written} facilities");
        Ok(written)
    }
}

fn write_facility(conn: &Connection, facility: &Facility) -> Result<(), rusqlite::Error> {
    let id = facility.id.as_str();
    conn.execute("DELETE FROM history WHERE facility_id = ?1", params![id])?;
    conn.execute("DELETE FROM capacities WHERE facility_id = ?1", params![id])?;
    conn.execute(
        "INSERT INTO facilities (id, name, city, lng, lat, oxygen_percentage, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            city = excluded.city,
            lng = excluded.lng,
            lat = excluded.lat,
            oxygen_percentage = excluded.oxygen_percentage,
            last_updated = excluded.last_updated",
        params![
            id,
            facility.name,
            facility.city,
            facility.location.x,
            facility.location.y,
            facility.oxygen_percentage.value(),
            facility.last_updated,
        ],
    )?;
    for (category, total, available) in capacity_rows(facility) {
        conn.execute(
            "INSERT INTO capacities (facility_id, category, total, available)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, category.as_str(), total, available],
        )?;
    }
    for sample in facility.history.samples() {
        conn.execute(
            "INSERT INTO history
                (facility_id, day, icu_available, general_available, oxygen_percentage)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                sample.date,
                sample.icu_available,
                sample.general_available,
                sample.oxygen_percentage,
            ],
        )?;
    }
    Ok(())
}

fn write_live_values(conn: &Connection, facility: &Facility) -> Result<(), rusqlite::Error> {
    let id = facility.id.as_str();
    conn.execute(
        "UPDATE facilities SET oxygen_percentage = ?2, last_updated = ?3 WHERE id = ?1",
        params![
            id,
            facility.oxygen_percentage.value(),
            facility.last_updated
        ],
    )?;
    for (category, _, available) in capacity_rows(facility) {
        conn.execute(
            "UPDATE capacities SET available = ?3 WHERE facility_id = ?1 AND category = ?2",
            params![id, category.as_str(), available],
        )?;
    }
    Ok(())
}

fn capacity_rows(facility: &Facility) -> Vec<(ResourceCategory, u32, Option<u32>)> {
    let mut rows = vec![
        (
            ResourceCategory::IcuBeds,
            facility.icu_beds.total,
            facility.icu_beds.available.value(),
        ),
        (
            ResourceCategory::GeneralBeds,
            facility.general_beds.total,
            facility.general_beds.available.value(),
        ),
    ];
    rows.extend(facility.specialists.iter().map(|(kind, capacity)| {
        (
            ResourceCategory::Specialist(*kind),
            capacity.total,
            Some(capacity.available),
        )
    }));
    rows
}

struct FacilityRow {
    id: String,
    name: String,
    city: String,
    lng: f64,
    lat: f64,
    oxygen_percentage: Option<u32>,
    last_updated: DateTime<Utc>,
}

fn load_facility(
    conn: &Connection,
    id: &str,
) -> Result<Option<Facility>, SqliteCapacityStoreError> {
    let header = conn
        .query_row(
            "SELECT id, name, city, lng, lat, oxygen_percentage, last_updated
               FROM facilities WHERE id = ?1",
            params![id],
            |row| {
                Ok(FacilityRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    city: row.get(2)?,
                    lng: row.get(3)?,
                    lat: row.get(4)?,
                    oxygen_percentage: row.get(5)?,
                    last_updated: row.get(6)?,
                })
            },
        )
        .optional()?;
    let Some(header) = header else {
        return Ok(None);
    };

    let mut facility = Facility::new(
        header.id,
        header.name,
        header.city,
        Coord {
            x: header.lng,
            y: header.lat,
        },
    )
    .with_oxygen(LiveValue::from(header.oxygen_percentage));
    facility.last_updated = header.last_updated;

    let mut statement = conn
        .prepare_cached("SELECT category, total, available FROM capacities WHERE facility_id = ?1")?;
    let rows = statement.query_map(params![id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, u32>(1)?,
            row.get::<_, Option<u32>>(2)?,
        ))
    })?;
    for row in rows {
        let (name, total, available) = row?;
        let category: ResourceCategory = name.parse().map_err(|source| {
            SqliteCapacityStoreError::InvalidCategory {
                facility_id: id.to_owned(),
                source,
            }
        })?;
        match category {
            ResourceCategory::IcuBeds => {
                facility.icu_beds = BedCapacity::new(total, available.into());
            }
            ResourceCategory::GeneralBeds => {
                facility.general_beds = BedCapacity::new(total, available.into());
            }
            ResourceCategory::Specialist(kind) => {
                facility
                    .specialists
                    .insert(kind, Capacity::new(total, available.unwrap_or(0)));
            }
        }
    }

    let mut statement = conn.prepare_cached(
        "SELECT day, icu_available, general_available, oxygen_percentage
           FROM history WHERE facility_id = ?1 ORDER BY day",
    )?;
    let samples = statement
        .query_map(params![id], |row| {
            Ok(DailySample {
                date: row.get::<_, NaiveDate>(0)?,
                icu_available: row.get(1)?,
                general_available: row.get(2)?,
                oxygen_percentage: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    facility.history = HistoryWindow::from_samples(samples);

    Ok(Some(facility))
}

fn backend<E>(operation: &'static str) -> impl FnOnce(E) -> StoreError
where
    E: Into<SqliteCapacityStoreError>,
{
    move |err| {
        let err: SqliteCapacityStoreError = err.into();
        warn!("sqlite {operation} failed: {err}");
        StoreError::unavailable(operation, err)
    }
}

fn not_found(id: &FacilityId) -> StoreError {
    StoreError::NotFound {
        facility_id: id.clone(),
    }
}

impl CapacityStore for SqliteCapacityStore {
    fn all(&self) -> Result<Vec<Facility>, StoreError> {
        let connection = self.connection.lock();
        let ids = connection
            .prepare_cached("SELECT id FROM facilities ORDER BY id")
            .and_then(|mut statement| {
                statement
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(backend("all"))?;
        let mut facilities = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(facility) = load_facility(&connection, &id).map_err(backend("all"))? {
                facilities.push(facility);
            }
        }
        Ok(facilities)
    }

    fn get(&self, id: &FacilityId) -> Result<Facility, StoreError> {
        let connection = self.connection.lock();
        load_facility(&connection, id.as_str())
            .map_err(backend("get"))?
            .ok_or_else(|| not_found(id))
    }

    fn conditional_decrement(
        &self,
        id: &FacilityId,
        category: ResourceCategory,
    ) -> Result<Facility, StoreError> {
        const OP: &str = "conditional_decrement";
        let mut connection = self.connection.lock();
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(backend(OP))?;
        let remaining: Option<u32> = tx
            .query_row(DECREMENT, params![id.as_str(), category.as_str()], |row| {
                row.get(0)
            })
            .optional()
            .map_err(backend(OP))?;

        if remaining.is_none() {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM facilities WHERE id = ?1",
                    params![id.as_str()],
                    |_| Ok(()),
                )
                .optional()
                .map_err(backend(OP))?
                .is_some();
            return Err(if exists {
                StoreError::CapacityExhausted {
                    facility_id: id.clone(),
                    category,
                }
            } else {
                not_found(id)
            });
        }

        tx.execute(
            "UPDATE facilities SET last_updated = ?2 WHERE id = ?1",
            params![id.as_str(), Utc::now()],
        )
        .map_err(backend(OP))?;
        let facility = load_facility(&tx, id.as_str())
            .map_err(backend(OP))?
            .ok_or_else(|| not_found(id))?;
        tx.commit().map_err(backend(OP))?;
        Ok(facility)
    }

    fn overwrite(&self, id: &FacilityId, update: &LiveUpdate) -> Result<Facility, StoreError> {
        const OP: &str = "overwrite";
        let mut connection = self.connection.lock();
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(backend(OP))?;
        let mut facility = load_facility(&tx, id.as_str())
            .map_err(backend(OP))?
            .ok_or_else(|| not_found(id))?;
        facility
            .apply_update(update, Utc::now())
            .map_err(|source| StoreError::InvalidUpdate {
                facility_id: id.clone(),
                source,
            })?;
        write_live_values(&tx, &facility).map_err(backend(OP))?;
        tx.commit().map_err(backend(OP))?;
        Ok(facility)
    }
}
