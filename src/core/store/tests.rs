use chrono::NaiveDate;
use tempfile::tempdir;

use super::*;
use crate::entities::{
    PhasePatch, PhasePayload, PhaseStatus, ProjectPatch, ProjectPayload, ProjectStatus,
    ResourcePatch, ResourcePayload, Severity, ValidationError,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn today() -> NaiveDate {
    date("2025-03-12")
}

fn empty_store() -> Store {
    Store::open_empty(Storage::in_memory()).unwrap()
}

fn project(name: &str, start: &str) -> ProjectPayload {
    ProjectPayload::new(name, date(start), date("2025-12-31"))
}

fn phase(name: &str, start: &str, end: &str, progress: u8) -> PhasePayload {
    PhasePayload {
        name: name.to_string(),
        start_date: date(start),
        end_date: date(end),
        progress,
        status: PhaseStatus::OnTrack,
    }
}

#[test]
fn test_open_seeds_fresh_storage() {
    let store = Store::open(Storage::in_memory(), today()).unwrap();

    assert_eq!(store.projects().len(), 4);
    assert!(!store.notifications().is_empty());
    assert!(store.projects().iter().any(|p| !p.phases.is_empty()));
    assert!(store.projects().iter().any(|p| !p.resources.is_empty()));
    assert!(store.storage.get(DATABASE_KEY).is_some());
}

#[test]
fn test_projects_ordered_by_start_date() {
    let store = Store::open(Storage::in_memory(), today()).unwrap();
    let starts: Vec<_> = store.projects().iter().map(|p| p.start_date).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn test_notifications_newest_first() {
    let store = Store::open(Storage::in_memory(), today()).unwrap();
    let stamps: Vec<_> = store.notifications().iter().map(|n| n.created_at).collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_open_empty_has_no_rows() {
    let store = empty_store();
    assert!(store.projects().is_empty());
    assert!(store.notifications().is_empty());
}

#[test]
fn test_add_project_assigns_ids_and_timestamps() {
    let mut store = empty_store();
    let id = store.add_project(&project("Harbour Road", "2025-01-01")).unwrap();

    assert!(id.starts_with("PRJ-"));
    assert_eq!(store.short_id(&id), Some("PRJ@1"));

    let added = store.project(&id).unwrap();
    assert_eq!(added.name, "Harbour Road");
    assert_eq!(added.status, ProjectStatus::Planned);
    assert_eq!(added.created_at, added.updated_at);
}

#[test]
fn test_duplicate_project_name_rejected() {
    let mut store = empty_store();
    store.add_project(&project("Harbour Road", "2025-01-01")).unwrap();

    let err = store
        .add_project(&project("  harbour ROAD ", "2025-02-01"))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateName(_)));
    assert_eq!(store.projects().len(), 1);
}

#[test]
fn test_update_project_merges_patch() {
    let mut store = empty_store();
    let mut payload = project("Harbour Road", "2025-01-01");
    payload.budget = 1000.0;
    let id = store.add_project(&payload).unwrap();
    let before = store.project(&id).unwrap().updated_at;

    let patch = ProjectPatch {
        status: Some(ProjectStatus::Active),
        spent: Some(250.0),
        ..Default::default()
    };
    assert!(store.update_project(&id, &patch).unwrap());

    let updated = store.project(&id).unwrap();
    assert_eq!(updated.status, ProjectStatus::Active);
    assert_eq!(updated.spent, 250.0);
    assert_eq!(updated.budget, 1000.0);
    assert_eq!(updated.name, "Harbour Road");
    assert!(updated.updated_at >= before);
}

#[test]
fn test_non_finite_amounts_rejected() {
    let mut store = empty_store();
    let mut payload = project("Harbour Road", "2025-01-01");
    payload.budget = f64::NAN;
    assert!(matches!(
        store.add_project(&payload),
        Err(StoreError::Invalid(ValidationError::NotFinite("budget")))
    ));
    assert!(store.projects().is_empty());

    payload.budget = 1000.0;
    let id = store.add_project(&payload).unwrap();
    let patch = ProjectPatch {
        spent: Some(f64::INFINITY),
        ..Default::default()
    };
    assert!(matches!(
        store.update_project(&id, &patch),
        Err(StoreError::Invalid(ValidationError::NotFinite("spent")))
    ));
    assert_eq!(store.project(&id).unwrap().spent, 0.0);
}

#[test]
fn test_update_missing_project_is_noop() {
    let mut store = empty_store();
    let patch = ProjectPatch {
        name: Some("Ghost".to_string()),
        ..Default::default()
    };
    assert!(!store.update_project("PRJ-NOPE", &patch).unwrap());
}

#[test]
fn test_update_allows_duplicate_name() {
    let mut store = empty_store();
    store.add_project(&project("Alpha", "2025-01-01")).unwrap();
    let beta = store.add_project(&project("Beta", "2025-02-01")).unwrap();

    let patch = ProjectPatch {
        name: Some("Alpha".to_string()),
        ..Default::default()
    };
    assert!(store.update_project(&beta, &patch).unwrap());
    assert_eq!(store.project(&beta).unwrap().name, "Alpha");
}

#[test]
fn test_phases_join_and_order() {
    let mut store = empty_store();
    let id = store.add_project(&project("Harbour Road", "2025-01-01")).unwrap();
    store
        .add_phase(&id, &phase("Paving", "2025-04-01", "2025-05-01", 10))
        .unwrap();
    store
        .add_phase(&id, &phase("Survey", "2025-01-01", "2025-02-01", 100))
        .unwrap();

    let names: Vec<_> = store.project(&id).unwrap().phases.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Survey", "Paving"]);
}

#[test]
fn test_add_phase_to_missing_project_fails() {
    let mut store = empty_store();
    let err = store
        .add_phase("PRJ-NOPE", &phase("Survey", "2025-01-01", "2025-02-01", 0))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: EntityPrefix::Prj, .. }));
}

#[test]
fn test_update_and_delete_phase() {
    let mut store = empty_store();
    let id = store.add_project(&project("Harbour Road", "2025-01-01")).unwrap();
    let phase_id = store
        .add_phase(&id, &phase("Survey", "2025-01-01", "2025-02-01", 0))
        .unwrap();

    let patch = PhasePatch {
        progress: Some(55),
        ..Default::default()
    };
    assert!(store.update_phase(&phase_id, &patch).unwrap());
    assert_eq!(store.project(&id).unwrap().phases[0].progress, 55);

    assert!(store.delete_phase(&phase_id).unwrap());
    assert!(store.project(&id).unwrap().phases.is_empty());
    assert!(store.short_id(&phase_id).is_none());
}

#[test]
fn test_update_and_delete_resource() {
    let mut store = empty_store();
    let id = store.add_project(&project("Harbour Road", "2025-01-01")).unwrap();
    let payload = ResourcePayload {
        name: "Road crew".to_string(),
        resource_type: "team".to_string(),
        allocation: 50,
    };
    let res_id = store.add_resource(&id, &payload).unwrap();
    assert_eq!(store.short_id(&res_id), Some("RES@1"));

    let patch = ResourcePatch {
        allocation: Some(75),
        ..Default::default()
    };
    assert!(store.update_resource(&res_id, &patch).unwrap());
    let resource = &store.project(&id).unwrap().resources[0];
    assert_eq!(resource.allocation, 75);
    assert_eq!(resource.resource_type, "team");

    assert!(store.delete_resource(&res_id).unwrap());
    assert!(!store.delete_resource(&res_id).unwrap());
}

#[test]
fn test_delete_project_cascades_and_unlinks_notifications() {
    let mut store = empty_store();
    let id = store.add_project(&project("Harbour Road", "2025-01-01")).unwrap();
    let phase_id = store
        .add_phase(&id, &phase("Survey", "2025-01-01", "2025-02-01", 0))
        .unwrap();
    let note_id = store
        .add_notification(Some(&id), "Budget review due", Severity::Warning)
        .unwrap();

    assert!(store.delete_project(&id).unwrap());

    assert!(store.projects().is_empty());
    assert!(store.short_id(&phase_id).is_none());
    let phases: i64 = store
        .conn
        .query_row("SELECT COUNT(*) FROM project_phases", [], |row| row.get(0))
        .unwrap();
    assert_eq!(phases, 0);

    let note = store.notifications().iter().find(|n| n.id == note_id).unwrap();
    assert_eq!(note.project_id, None);
}

#[test]
fn test_mark_notification_read() {
    let mut store = empty_store();
    let id = store
        .add_notification(None, "Council meeting moved", Severity::Info)
        .unwrap();
    assert!(!store.notifications()[0].is_read);

    assert!(store.mark_notification_read(&id).unwrap());
    assert!(store.notifications()[0].is_read);
    assert!(!store.mark_notification_read("NTF-NOPE").unwrap());
}

#[test]
fn test_resolve_short_full_and_partial() {
    let mut store = empty_store();
    let id = store.add_project(&project("Harbour Road", "2025-01-01")).unwrap();

    assert_eq!(store.resolve(EntityPrefix::Prj, "PRJ@1").unwrap(), id);
    assert_eq!(store.resolve(EntityPrefix::Prj, "prj@1").unwrap(), id);
    assert_eq!(store.resolve(EntityPrefix::Prj, &id).unwrap(), id);
    assert_eq!(store.resolve(EntityPrefix::Prj, &id[id.len() - 8..]).unwrap(), id);

    assert!(matches!(
        store.resolve(EntityPrefix::Prj, "PRJ@9"),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.resolve(EntityPrefix::Phs, "PRJ@1"),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.resolve(EntityPrefix::Res, &id),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_resolve_ambiguous_fragment() {
    let mut store = empty_store();
    store.add_project(&project("Alpha", "2025-01-01")).unwrap();
    store.add_project(&project("Beta", "2025-02-01")).unwrap();

    let err = store.resolve(EntityPrefix::Prj, "PRJ-").unwrap_err();
    assert!(matches!(err, StoreError::Ambiguous { .. }));
}

#[test]
fn test_resolve_fragment_is_literal() {
    let mut store = empty_store();
    let id = store.add_project(&project("Only", "2025-01-01")).unwrap();

    for reference in ["%", "_", "PRJ-%", "\\"] {
        assert!(
            matches!(
                store.resolve(EntityPrefix::Prj, reference),
                Err(StoreError::NotFound { .. })
            ),
            "{reference} should not match"
        );
    }
    let lower = id[id.len() - 6..].to_lowercase();
    assert_eq!(store.resolve(EntityPrefix::Prj, &lower).unwrap(), id);
}

#[test]
fn test_snapshot_survives_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("storage.json");

    let id = {
        let mut store = Store::open_empty(Storage::load(&path).unwrap()).unwrap();
        store.add_project(&project("بلدية الشمال", "2025-01-01")).unwrap()
    };

    let reopened = Store::open(Storage::load(&path).unwrap(), today()).unwrap();
    assert_eq!(reopened.projects().len(), 1);
    assert_eq!(reopened.project(&id).unwrap().name, "بلدية الشمال");
    assert_eq!(reopened.short_id(&id), Some("PRJ@1"));
}

#[test]
fn test_short_id_counter_survives_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("storage.json");

    {
        let mut store = Store::open_empty(Storage::load(&path).unwrap()).unwrap();
        store.add_project(&project("Alpha", "2025-01-01")).unwrap();
    }

    let mut store = Store::open(Storage::load(&path).unwrap(), today()).unwrap();
    let id = store.add_project(&project("Beta", "2025-02-01")).unwrap();
    assert_eq!(store.short_id(&id), Some("PRJ@2"));
}

#[test]
fn test_corrupt_snapshot_is_an_error() {
    let mut storage = Storage::in_memory();
    storage.set(DATABASE_KEY, "%%% not a snapshot %%%".to_string());
    assert!(Store::open(storage, today()).is_err());
}

#[test]
fn test_schema_version_mismatch_rejected() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("storage.json");
    {
        let store = Store::open_empty(Storage::load(&path).unwrap()).unwrap();
        store
            .conn
            .execute("UPDATE schema_version SET version = 99", [])
            .unwrap();
        let mut store = store;
        store.persist().unwrap();
    }

    let err = Store::open(Storage::load(&path).unwrap(), today())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StoreError::SchemaVersion {
            found: 99,
            expected: SCHEMA_VERSION
        }
    ));
}
