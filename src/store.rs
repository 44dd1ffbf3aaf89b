//! Persistence of saved roadmaps.
//!
//! All roadmaps live as one JSON array under a single key of a key-value
//! [`Slot`]. Every operation re-reads the slot and every mutation rewrites the
//! whole array. There is no locking: two processes saving at the same time can
//! overwrite each other's changes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};

use crate::roadmap::Roadmap;
use crate::slug;

/// Key the roadmap collection is stored under.
pub const ROADMAPS_KEY: &str = "roadmaps";

/// Errors reading or writing the roadmap collection.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read saved roadmaps: {0}")]
    Read(String),

    #[error("saved roadmaps are corrupt: {0}")]
    Corrupt(String),

    #[error("failed to write roadmaps: {0}")]
    Write(String),
}

/// A named string slot in some local key-value medium.
pub trait Slot {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Slots kept in a `slots` table of a SQLite database.
pub struct SqliteSlot {
    conn: Connection,
}

impl SqliteSlot {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Read(format!("could not create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Read(format!("could not open {}: {}", path.display(), e)))?;
        debug!(path = ?path, "store_opened");
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Read(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS slots (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(|e| StoreError::Read(format!("could not create slots table: {}", e)))?;

        Ok(Self { conn })
    }
}

impl Slot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row("SELECT value FROM slots WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO slots (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|e| StoreError::Write(e.to_string()))
    }
}

/// Slots held in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Result of listing roadmaps. Always usable: on failure `roadmaps` is empty
/// and `error` says why.
#[derive(Debug)]
pub struct LoadedRoadmaps {
    /// Newest first.
    pub roadmaps: Vec<Roadmap>,
    pub error: Option<StoreError>,
}

/// CRUD over the saved roadmap collection.
pub struct RoadmapStore<S: Slot> {
    slot: S,
}

impl<S: Slot> RoadmapStore<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// Lists all roadmaps, newest first.
    ///
    /// Roadmaps with equal timestamps are ordered most recently saved first.
    pub fn list(&self) -> LoadedRoadmaps {
        match self.load() {
            Ok(mut roadmaps) => {
                roadmaps.reverse();
                roadmaps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                LoadedRoadmaps {
                    roadmaps,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "roadmaps_load_failed");
                LoadedRoadmaps {
                    roadmaps: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Appends `roadmap` to the collection.
    ///
    /// Titles are not unique; saving the same title twice keeps both. If the
    /// stored collection cannot be read it is left untouched and the error is
    /// returned.
    pub fn save(&mut self, roadmap: &Roadmap) -> Result<(), StoreError> {
        let mut roadmaps = self.load()?;
        roadmaps.push(roadmap.clone());
        self.persist(&roadmaps)?;
        info!(title = %roadmap.title, slug = %roadmap.slug(), count = roadmaps.len(), "roadmap_saved");
        Ok(())
    }

    /// Finds the first stored roadmap whose title encodes to `slug`.
    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Roadmap>, StoreError> {
        let found = self
            .load()?
            .into_iter()
            .find(|roadmap| slug::encode(&roadmap.title) == slug);
        debug!(slug, found = found.is_some(), "roadmap_lookup");
        Ok(found)
    }

    /// Removes every roadmap titled exactly `title` and returns how many went.
    pub fn delete_by_title(&mut self, title: &str) -> Result<usize, StoreError> {
        let mut roadmaps = self.load()?;
        let before = roadmaps.len();
        roadmaps.retain(|roadmap| roadmap.title != title);
        let removed = before - roadmaps.len();

        if removed > 0 {
            self.persist(&roadmaps)?;
        }
        info!(title, removed, "roadmap_deleted");
        Ok(removed)
    }

    /// Reads the collection in stored order.
    fn load(&self) -> Result<Vec<Roadmap>, StoreError> {
        match self.slot.read(ROADMAPS_KEY)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    fn persist(&mut self, roadmaps: &[Roadmap]) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(roadmaps).map_err(|e| StoreError::Write(e.to_string()))?;
        self.slot.write(ROADMAPS_KEY, &json)
    }
}
