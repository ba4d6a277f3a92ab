//! SQLite-backed project store
//!
//! This module provides the data access facade the dashboard runs on:
//! - An in-memory SQLite database holds projects, phases, resources and
//!   notifications
//! - Every mutation persists a full snapshot of the database, base64-encoded,
//!   into local key-value storage and then reloads every table
//! - Phases and resources are joined to their projects in memory
//!
//! The snapshot is the only durable copy. There is no incremental write-ahead
//! and no migration: a snapshot from another schema version is rejected.

mod mutations;
mod queries;
mod schema;
mod seed;
mod snapshot;

use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{Connection, Transaction};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::identity::EntityPrefix;
use crate::core::storage::{Storage, StorageError, DATABASE_KEY};
use crate::entities::{Notification, ProjectWithRelations, ValidationError};

/// Current schema version - snapshots with another version are refused
const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("stored snapshot is not valid base64: {0}")]
    SnapshotEncoding(#[from] base64::DecodeError),

    #[error("snapshot I/O failed: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("stored snapshot has schema version {found}, expected {expected}")]
    SchemaVersion { found: i32, expected: i32 },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("a project named '{0}' already exists")]
    DuplicateName(String),

    #[error("no {kind} matches '{reference}'")]
    NotFound {
        kind: EntityPrefix,
        reference: String,
    },

    #[error("'{reference}' is ambiguous, it matches: {matches}")]
    Ambiguous { reference: String, matches: String },
}

/// The project store backed by an in-memory SQLite database
pub struct Store {
    conn: Connection,
    storage: Storage,
    projects: Vec<ProjectWithRelations>,
    notifications: Vec<Notification>,
    short_ids: HashMap<String, String>,
}

impl Store {
    /// Open the store from storage
    ///
    /// Restores the snapshot held under [`DATABASE_KEY`] if there is one.
    /// Otherwise creates the schema, seeds sample data relative to `today`
    /// and persists the result.
    pub fn open(storage: Storage, today: NaiveDate) -> Result<Self, StoreError> {
        let mut store = Self::connect(storage)?;

        if let Some(encoded) = store.storage.get(DATABASE_KEY) {
            let encoded = encoded.to_string();
            snapshot::restore(&mut store.conn, &encoded)?;
            store.check_schema_version()?;
            info!(bytes = encoded.len(), "restored database snapshot");
        } else {
            store.init_schema()?;
            store.seed(today)?;
            store.persist()?;
            info!("created and seeded new database");
        }

        store.enable_foreign_keys()?;
        store.refresh()?;
        Ok(store)
    }

    /// Open the store with the schema only and no sample data
    ///
    /// Any snapshot already in storage is replaced.
    pub fn open_empty(storage: Storage) -> Result<Self, StoreError> {
        let mut store = Self::connect(storage)?;
        store.init_schema()?;
        store.enable_foreign_keys()?;
        store.persist()?;
        store.refresh()?;
        Ok(store)
    }

    fn connect(storage: Storage) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            storage,
            projects: Vec::new(),
            notifications: Vec::new(),
            short_ids: HashMap::new(),
        })
    }

    fn enable_foreign_keys(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    fn check_schema_version(&self) -> Result<(), StoreError> {
        let found: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if found != SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Serialize the whole database into storage and save it
    fn persist(&mut self) -> Result<(), StoreError> {
        let encoded = snapshot::export(&self.conn)?;
        debug!(bytes = encoded.len(), "persisting database snapshot");
        self.storage.set(DATABASE_KEY, encoded);
        self.storage.save()?;
        Ok(())
    }

    /// Run a write inside a transaction, then persist and reload
    fn run<T>(
        &mut self,
        write: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let tx = self.conn.transaction()?;
        let value = write(&tx)?;
        tx.commit()?;

        self.persist()?;
        self.refresh()?;
        Ok(value)
    }

    /// Projects with their phases and resources, ordered by start date
    pub fn projects(&self) -> &[ProjectWithRelations] {
        &self.projects
    }

    /// Notifications, newest first
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Find a loaded project by full ID
    pub fn project(&self, id: &str) -> Option<&ProjectWithRelations> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Short ID (`PRJ@N`) of an entity, if one was allocated
    pub fn short_id(&self, entity_id: &str) -> Option<&str> {
        self.short_ids.get(entity_id).map(String::as_str)
    }

    /// Short ID if known, otherwise the full ID
    pub fn display_id(&self, entity_id: &str) -> String {
        self.short_id(entity_id)
            .map(String::from)
            .unwrap_or_else(|| entity_id.to_string())
    }

    /// Give back the storage, e.g. to persist a locale change
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests;
