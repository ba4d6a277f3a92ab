//! Mutations: insert/update/delete followed by persist and full reload

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::queries::{
    map_phase, map_project, map_resource, PHASE_COLUMNS, PROJECT_COLUMNS, RESOURCE_COLUMNS,
};
use super::{Store, StoreError};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{
    PhasePatch, PhasePayload, ProjectPatch, ProjectPayload, ResourcePatch, ResourcePayload,
    Severity,
};

pub(super) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Allocate the next `PREFIX@N` for an entity
fn allocate_short_id(conn: &Connection, entity_id: &str) -> Result<String, StoreError> {
    let prefix = entity_id.split('-').next().unwrap_or(entity_id);

    let next_id: i64 = conn
        .query_row(
            "SELECT next_id FROM short_id_counters WHERE prefix = ?1",
            params![prefix],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(1);

    let short_id = format!("{}@{}", prefix, next_id);
    conn.execute(
        "INSERT INTO short_ids (short_id, entity_id, prefix) VALUES (?1, ?2, ?3)",
        params![short_id, entity_id, prefix],
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO short_id_counters (prefix, next_id) VALUES (?1, ?2)",
        params![prefix, next_id + 1],
    )?;

    Ok(short_id)
}

pub(super) fn insert_project(
    conn: &Connection,
    payload: &ProjectPayload,
    now: DateTime<Utc>,
) -> Result<String, StoreError> {
    let id = EntityId::new(EntityPrefix::Prj).to_string();
    let stamp = timestamp(now);
    conn.execute(
        "INSERT INTO projects (id, name, description, status, start_date, end_date, budget, spent, health, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            id,
            payload.name.trim(),
            payload.description,
            payload.status.to_string(),
            payload.start_date.to_string(),
            payload.end_date.to_string(),
            payload.budget,
            payload.spent,
            payload.health.to_string(),
            stamp,
            stamp,
        ],
    )?;
    allocate_short_id(conn, &id)?;
    Ok(id)
}

pub(super) fn insert_phase(
    conn: &Connection,
    project_id: &str,
    payload: &PhasePayload,
) -> Result<String, StoreError> {
    let id = EntityId::new(EntityPrefix::Phs).to_string();
    conn.execute(
        "INSERT INTO project_phases (id, project_id, name, start_date, end_date, progress, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            project_id,
            payload.name.trim(),
            payload.start_date.to_string(),
            payload.end_date.to_string(),
            payload.progress,
            payload.status.to_string(),
        ],
    )?;
    allocate_short_id(conn, &id)?;
    Ok(id)
}

pub(super) fn insert_resource(
    conn: &Connection,
    project_id: &str,
    payload: &ResourcePayload,
) -> Result<String, StoreError> {
    let id = EntityId::new(EntityPrefix::Res).to_string();
    conn.execute(
        "INSERT INTO resources (id, project_id, name, type, allocation) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id,
            project_id,
            payload.name.trim(),
            payload.resource_type.trim(),
            payload.allocation,
        ],
    )?;
    allocate_short_id(conn, &id)?;
    Ok(id)
}

pub(super) fn insert_notification(
    conn: &Connection,
    project_id: Option<&str>,
    message: &str,
    severity: Severity,
    at: DateTime<Utc>,
) -> Result<String, StoreError> {
    let id = EntityId::new(EntityPrefix::Ntf).to_string();
    conn.execute(
        "INSERT INTO notifications (id, project_id, message, severity, created_at, is_read)
         VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        params![id, project_id, message, severity.to_string(), timestamp(at)],
    )?;
    allocate_short_id(conn, &id)?;
    Ok(id)
}

fn ensure_project(conn: &Connection, project_id: &str) -> Result<(), StoreError> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT id FROM projects WHERE id = ?1",
            params![project_id],
            |row| row.get(0),
        )
        .optional()?;
    exists.map(|_| ()).ok_or_else(|| StoreError::NotFound {
        kind: EntityPrefix::Prj,
        reference: project_id.to_string(),
    })
}

fn forget_short_id(conn: &Connection, entity_id: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM short_ids WHERE entity_id = ?1",
        params![entity_id],
    )?;
    Ok(())
}

impl Store {
    /// Create a project; names must be unique ignoring case and surrounding space
    pub fn add_project(&mut self, payload: &ProjectPayload) -> Result<String, StoreError> {
        payload.validate()?;
        let wanted = payload.name.trim().to_lowercase();
        if self
            .projects
            .iter()
            .any(|p| p.name.trim().to_lowercase() == wanted)
        {
            return Err(StoreError::DuplicateName(payload.name.trim().to_string()));
        }

        let id = self.run(|tx| insert_project(tx, payload, Utc::now()))?;
        info!(%id, name = %payload.name, "added project");
        Ok(id)
    }

    /// Apply a partial update; returns false when the project does not exist
    pub fn update_project(&mut self, id: &str, patch: &ProjectPatch) -> Result<bool, StoreError> {
        let current = self
            .conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1 LIMIT 1", PROJECT_COLUMNS),
                params![id],
                map_project,
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(false);
        };

        let merged = current.payload().merge(patch);
        merged.validate()?;
        self.run(|tx| {
            tx.execute(
                "UPDATE projects SET name = ?1, description = ?2, status = ?3, start_date = ?4, end_date = ?5,
                 budget = ?6, spent = ?7, health = ?8, updated_at = ?9 WHERE id = ?10",
                params![
                    merged.name.trim(),
                    merged.description,
                    merged.status.to_string(),
                    merged.start_date.to_string(),
                    merged.end_date.to_string(),
                    merged.budget,
                    merged.spent,
                    merged.health.to_string(),
                    timestamp(Utc::now()),
                    id,
                ],
            )?;
            Ok(())
        })?;
        info!(%id, "updated project");
        Ok(true)
    }

    /// Delete a project together with its phases and resources
    ///
    /// Notifications that referenced the project are kept, unlinked.
    pub fn delete_project(&mut self, id: &str) -> Result<bool, StoreError> {
        let removed = self.run(|tx| {
            tx.execute(
                "DELETE FROM short_ids WHERE entity_id = ?1
                    OR entity_id IN (SELECT id FROM project_phases WHERE project_id = ?1)
                    OR entity_id IN (SELECT id FROM resources WHERE project_id = ?1)",
                params![id],
            )?;
            Ok(tx.execute("DELETE FROM projects WHERE id = ?1", params![id])? > 0)
        })?;
        info!(%id, removed, "deleted project");
        Ok(removed)
    }

    pub fn add_phase(&mut self, project_id: &str, payload: &PhasePayload) -> Result<String, StoreError> {
        let id = self.run(|tx| {
            ensure_project(tx, project_id)?;
            insert_phase(tx, project_id, payload)
        })?;
        info!(%id, %project_id, "added phase");
        Ok(id)
    }

    pub fn update_phase(&mut self, id: &str, patch: &PhasePatch) -> Result<bool, StoreError> {
        let current = self
            .conn
            .query_row(
                &format!("SELECT {} FROM project_phases WHERE id = ?1 LIMIT 1", PHASE_COLUMNS),
                params![id],
                map_phase,
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(false);
        };

        let merged = current.payload().merge(patch);
        self.run(|tx| {
            tx.execute(
                "UPDATE project_phases SET name = ?1, start_date = ?2, end_date = ?3, progress = ?4, status = ?5
                 WHERE id = ?6",
                params![
                    merged.name.trim(),
                    merged.start_date.to_string(),
                    merged.end_date.to_string(),
                    merged.progress,
                    merged.status.to_string(),
                    id,
                ],
            )?;
            Ok(())
        })?;
        info!(%id, "updated phase");
        Ok(true)
    }

    pub fn delete_phase(&mut self, id: &str) -> Result<bool, StoreError> {
        let removed = self.run(|tx| {
            forget_short_id(tx, id)?;
            Ok(tx.execute("DELETE FROM project_phases WHERE id = ?1", params![id])? > 0)
        })?;
        info!(%id, removed, "deleted phase");
        Ok(removed)
    }

    pub fn add_resource(
        &mut self,
        project_id: &str,
        payload: &ResourcePayload,
    ) -> Result<String, StoreError> {
        let id = self.run(|tx| {
            ensure_project(tx, project_id)?;
            insert_resource(tx, project_id, payload)
        })?;
        info!(%id, %project_id, "added resource");
        Ok(id)
    }

    pub fn update_resource(&mut self, id: &str, patch: &ResourcePatch) -> Result<bool, StoreError> {
        let current = self
            .conn
            .query_row(
                &format!("SELECT {} FROM resources WHERE id = ?1 LIMIT 1", RESOURCE_COLUMNS),
                params![id],
                map_resource,
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(false);
        };

        let merged = current.payload().merge(patch);
        self.run(|tx| {
            tx.execute(
                "UPDATE resources SET name = ?1, type = ?2, allocation = ?3 WHERE id = ?4",
                params![
                    merged.name.trim(),
                    merged.resource_type.trim(),
                    merged.allocation,
                    id
                ],
            )?;
            Ok(())
        })?;
        info!(%id, "updated resource");
        Ok(true)
    }

    pub fn delete_resource(&mut self, id: &str) -> Result<bool, StoreError> {
        let removed = self.run(|tx| {
            forget_short_id(tx, id)?;
            Ok(tx.execute("DELETE FROM resources WHERE id = ?1", params![id])? > 0)
        })?;
        info!(%id, removed, "deleted resource");
        Ok(removed)
    }

    /// Post a notification, optionally about a project
    pub fn add_notification(
        &mut self,
        project_id: Option<&str>,
        message: &str,
        severity: Severity,
    ) -> Result<String, StoreError> {
        let id = self.run(|tx| {
            if let Some(project_id) = project_id {
                ensure_project(tx, project_id)?;
            }
            insert_notification(tx, project_id, message, severity, Utc::now())
        })?;
        info!(%id, %severity, "added notification");
        Ok(id)
    }

    pub fn mark_notification_read(&mut self, id: &str) -> Result<bool, StoreError> {
        let changed = self.run(|tx| {
            Ok(tx.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1",
                params![id],
            )? > 0)
        })?;
        info!(%id, changed, "marked notification read");
        Ok(changed)
    }
}
