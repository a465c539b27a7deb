//! # Database State
//!
//! Wraps the `Database` handle together with the id generator used for
//! every record the terminal writes.
//!
//! ## Thread Safety
//! `Database` holds a `SqlitePool`, which is safe to share. The id
//! generator only uses an atomic counter.

use std::sync::Arc;

use tally_core::ids::IdGenerator;
use tally_db::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
    ids: Arc<IdGenerator>,
}

impl DbState {
    /// Wraps a connected database. Probes the id source once.
    pub fn new(db: Database) -> Self {
        DbState::with_ids(db, IdGenerator::detect())
    }

    pub fn with_ids(db: Database, ids: IdGenerator) -> Self {
        DbState {
            db,
            ids: Arc::new(ids),
        }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }
}
