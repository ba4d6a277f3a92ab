//! Report export as JSON or CSV

use thiserror::Error;

use crate::core::metrics::project_progress;
use crate::entities::ProjectWithRelations;

pub const CSV_HEADER: [&str; 11] = [
    "id",
    "name",
    "status",
    "start_date",
    "end_date",
    "budget",
    "spent",
    "health",
    "progress",
    "phases",
    "resources",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Pretty-printed JSON array of projects with their phases and resources
pub fn to_json(projects: &[ProjectWithRelations]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(projects)?)
}

/// One CSV row per project, phases and resources given as counts
pub fn to_csv(projects: &[ProjectWithRelations]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for project in projects {
        wtr.write_record([
            project.id.clone(),
            project.name.clone(),
            project.status.to_string(),
            project.start_date.to_string(),
            project.end_date.to_string(),
            project.budget.to_string(),
            project.spent.to_string(),
            project.health.to_string(),
            project_progress(project).to_string(),
            project.phases.len().to_string(),
            project.resources.len().to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{HealthStatus, Phase, PhaseStatus, Project, ProjectStatus};
    use chrono::{NaiveDate, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Vec<ProjectWithRelations> {
        let now = Utc::now();
        vec![ProjectWithRelations {
            project: Project {
                id: "PRJ-01".to_string(),
                name: "Harbour Road, North".to_string(),
                description: "Resurfacing".to_string(),
                status: ProjectStatus::OnHold,
                start_date: date("2025-01-01"),
                end_date: date("2025-06-30"),
                budget: 1500.5,
                spent: 300.0,
                health: HealthStatus::Critical,
                created_at: now,
                updated_at: now,
            },
            phases: vec![Phase {
                id: "PHS-01".to_string(),
                project_id: "PRJ-01".to_string(),
                name: "Survey".to_string(),
                start_date: date("2025-01-01"),
                end_date: date("2025-02-01"),
                progress: 40,
                status: PhaseStatus::Delayed,
            }],
            resources: Vec::new(),
        }]
    }

    #[test]
    fn test_csv_header_and_row() {
        let csv = to_csv(&sample()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,name,status,start_date,end_date,budget,spent,health,progress,phases,resources"
        );
        assert_eq!(
            lines.next().unwrap(),
            "PRJ-01,\"Harbour Road, North\",on_hold,2025-01-01,2025-06-30,1500.5,300,critical,40,1,0"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_empty_has_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_json_keeps_relations() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "PRJ-01");
        assert_eq!(first["startDate"], "2025-01-01");
        assert_eq!(first["status"], "on_hold");
        assert_eq!(first["phases"][0]["progress"], 40);
        assert!(first["resources"].as_array().unwrap().is_empty());
    }
}
