//! Query methods: the full reload and reference resolution

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{Store, StoreError};
use crate::core::identity::{EntityId, EntityPrefix, ShortId};
use crate::entities::{Notification, Phase, Project, ProjectWithRelations, Resource};

/// Read a TEXT column through `FromStr`
fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, format!("'{}': {}", raw, e).into())
    })
}

pub(super) const PROJECT_COLUMNS: &str = "id, name, description, status, start_date, end_date, budget, spent, health, created_at, updated_at";

pub(super) fn map_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        status: parsed(row, 3)?,
        start_date: parsed(row, 4)?,
        end_date: parsed(row, 5)?,
        budget: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
        spent: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
        health: match row.get::<_, Option<String>>(8)? {
            Some(_) => parsed(row, 8)?,
            None => Default::default(),
        },
        created_at: parsed(row, 9)?,
        updated_at: parsed(row, 10)?,
    })
}

pub(super) const PHASE_COLUMNS: &str =
    "id, project_id, name, start_date, end_date, progress, status";

pub(super) fn map_phase(row: &Row<'_>) -> rusqlite::Result<Phase> {
    Ok(Phase {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        start_date: parsed(row, 3)?,
        end_date: parsed(row, 4)?,
        progress: row.get(5)?,
        status: parsed(row, 6)?,
    })
}

pub(super) const RESOURCE_COLUMNS: &str = "id, project_id, name, type, allocation";

pub(super) fn map_resource(row: &Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        resource_type: row.get(3)?,
        allocation: row.get(4)?,
    })
}

fn map_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        project_id: row.get(1)?,
        message: row.get(2)?,
        severity: parsed(row, 3)?,
        created_at: parsed(row, 4)?,
        is_read: row.get::<_, i64>(5)? != 0,
    })
}

impl Store {
    /// Reload every table and rebuild the joined project view
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        let rows = self.select_all(
            &format!(
                "SELECT {} FROM projects ORDER BY DATE(start_date) ASC, rowid ASC",
                PROJECT_COLUMNS
            ),
            map_project,
        )?;
        let phases = self.select_all(
            &format!(
                "SELECT {} FROM project_phases ORDER BY DATE(start_date) ASC, rowid ASC",
                PHASE_COLUMNS
            ),
            map_phase,
        )?;
        let resources = self.select_all(
            &format!("SELECT {} FROM resources ORDER BY rowid ASC", RESOURCE_COLUMNS),
            map_resource,
        )?;
        let notifications = self.select_all(
            "SELECT id, project_id, message, severity, created_at, is_read
             FROM notifications ORDER BY created_at DESC, rowid DESC",
            map_notification,
        )?;
        let short_ids: HashMap<String, String> = self
            .select_all("SELECT entity_id, short_id FROM short_ids", |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .into_iter()
            .collect();

        let mut phases_by_project: HashMap<String, Vec<Phase>> = HashMap::new();
        for phase in phases {
            phases_by_project
                .entry(phase.project_id.clone())
                .or_default()
                .push(phase);
        }
        let mut resources_by_project: HashMap<String, Vec<Resource>> = HashMap::new();
        for resource in resources {
            resources_by_project
                .entry(resource.project_id.clone())
                .or_default()
                .push(resource);
        }

        self.projects = rows
            .into_iter()
            .map(|project| ProjectWithRelations {
                phases: phases_by_project.remove(&project.id).unwrap_or_default(),
                resources: resources_by_project.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect();
        self.notifications = notifications;
        self.short_ids = short_ids;

        debug!(
            projects = self.projects.len(),
            notifications = self.notifications.len(),
            "refreshed store view"
        );
        Ok(())
    }

    fn select_all<T>(
        &self,
        sql: &str,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    /// Resolve a user-supplied reference to a full entity ID
    ///
    /// Accepts a short ID (`PRJ@3`), a full ID, or a unique fragment of one.
    pub fn resolve(&self, kind: EntityPrefix, reference: &str) -> Result<String, StoreError> {
        let reference = reference.trim();
        let not_found = || StoreError::NotFound {
            kind,
            reference: reference.to_string(),
        };

        if let Some(short) = ShortId::parse(reference) {
            if short.prefix != kind {
                return Err(not_found());
            }
            return self
                .conn
                .query_row(
                    "SELECT entity_id FROM short_ids WHERE short_id = ?1",
                    params![short.to_string()],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(not_found);
        }

        if reference.is_empty() {
            return Err(not_found());
        }
        // A well-formed ID of another kind can never match this table
        if let Ok(id) = EntityId::parse(reference) {
            if id.prefix() != kind {
                return Err(not_found());
            }
        }

        let table = kind.table();
        let exact: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT id FROM {} WHERE id = ?1", table),
                params![reference],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = exact {
            return Ok(id);
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {} WHERE instr(id, upper(?1)) > 0 LIMIT 6",
            table
        ))?;
        let matches = stmt
            .query_map(params![reference], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match matches.len() {
            0 => Err(not_found()),
            1 => Ok(matches.into_iter().next().unwrap_or_default()),
            _ => Err(StoreError::Ambiguous {
                reference: reference.to_string(),
                matches: matches.join(", "),
            }),
        }
    }
}
