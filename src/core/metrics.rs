//! Derived dashboard metrics
//!
//! Everything here is computed from the refreshed project view; nothing is
//! stored.

use serde::Serialize;

use crate::entities::{HealthStatus, ProjectStatus, ProjectWithRelations};

/// Round to the nearest integer, halves going up
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Progress of one project as a whole percentage
///
/// A project without phases counts as done only when it is completed.
pub fn project_progress(project: &ProjectWithRelations) -> u8 {
    if project.phases.is_empty() {
        return if project.status == ProjectStatus::Completed {
            100
        } else {
            0
        };
    }

    let total: f64 = project.phases.iter().map(|p| f64::from(p.progress)).sum();
    round_half_up(total / project.phases.len() as f64).clamp(0, 100) as u8
}

/// Mean progress across all projects, 0 when there are none
pub fn average_progress(projects: &[ProjectWithRelations]) -> u8 {
    if projects.is_empty() {
        return 0;
    }
    let total: f64 = projects.iter().map(|p| f64::from(project_progress(p))).sum();
    round_half_up(total / projects.len() as f64).clamp(0, 100) as u8
}

/// Spent as a whole percentage of budget, 0 when nothing is budgeted
pub fn budget_utilization(total_budget: f64, total_spent: f64) -> i64 {
    if total_budget == 0.0 {
        return 0;
    }
    round_half_up(total_spent / total_budget * 100.0)
}

/// The metric cards shown at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_budget: f64,
    pub total_spent: f64,
    pub budget_utilization: i64,
    pub average_progress: u8,
    pub headline_health: Option<HealthStatus>,
}

impl DashboardMetrics {
    pub fn compute(projects: &[ProjectWithRelations]) -> Self {
        let count = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();
        let total_budget: f64 = projects.iter().map(|p| p.budget).sum();
        let total_spent: f64 = projects.iter().map(|p| p.spent).sum();

        Self {
            total_projects: projects.len(),
            active_projects: count(ProjectStatus::Active),
            completed_projects: count(ProjectStatus::Completed),
            total_budget,
            total_spent,
            budget_utilization: budget_utilization(total_budget, total_spent),
            average_progress: average_progress(projects),
            headline_health: projects.first().map(|p| p.health),
        }
    }

    pub fn remaining_budget(&self) -> f64 {
        self.total_budget - self.total_spent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Phase, PhaseStatus, Project};
    use chrono::{NaiveDate, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn project(status: ProjectStatus, budget: f64, spent: f64, progress: &[u8]) -> ProjectWithRelations {
        let now = Utc::now();
        let id = format!("PRJ-{}", budget);
        ProjectWithRelations {
            phases: progress
                .iter()
                .map(|&p| Phase {
                    id: format!("PHS-{}", p),
                    project_id: id.clone(),
                    name: "phase".to_string(),
                    start_date: date("2025-01-01"),
                    end_date: date("2025-02-01"),
                    progress: p,
                    status: PhaseStatus::OnTrack,
                })
                .collect(),
            resources: Vec::new(),
            project: Project {
                id,
                name: "p".to_string(),
                description: String::new(),
                status,
                start_date: date("2025-01-01"),
                end_date: date("2025-12-31"),
                budget,
                spent,
                health: HealthStatus::Warning,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn test_progress_without_phases() {
        assert_eq!(project_progress(&project(ProjectStatus::Completed, 1.0, 0.0, &[])), 100);
        assert_eq!(project_progress(&project(ProjectStatus::Active, 1.0, 0.0, &[])), 0);
    }

    #[test]
    fn test_progress_is_rounded_mean() {
        assert_eq!(project_progress(&project(ProjectStatus::Active, 1.0, 0.0, &[10, 20, 25])), 18);
        assert_eq!(project_progress(&project(ProjectStatus::Active, 1.0, 0.0, &[50, 51])), 51);
    }

    #[test]
    fn test_average_progress() {
        assert_eq!(average_progress(&[]), 0);
        let projects = vec![
            project(ProjectStatus::Completed, 1.0, 0.0, &[]),
            project(ProjectStatus::Active, 2.0, 0.0, &[25]),
        ];
        assert_eq!(average_progress(&projects), 63);
    }

    #[test]
    fn test_budget_utilization() {
        assert_eq!(budget_utilization(0.0, 500.0), 0);
        assert_eq!(budget_utilization(1000.0, 333.0), 33);
        assert_eq!(budget_utilization(1000.0, 1250.0), 125);
    }

    #[test]
    fn test_dashboard_metrics() {
        let projects = vec![
            project(ProjectStatus::Active, 1000.0, 400.0, &[40]),
            project(ProjectStatus::Completed, 3000.0, 2800.0, &[]),
            project(ProjectStatus::Planned, 0.0, 0.0, &[]),
        ];
        let metrics = DashboardMetrics::compute(&projects);

        assert_eq!(metrics.total_projects, 3);
        assert_eq!(metrics.active_projects, 1);
        assert_eq!(metrics.completed_projects, 1);
        assert_eq!(metrics.total_budget, 4000.0);
        assert_eq!(metrics.total_spent, 3200.0);
        assert_eq!(metrics.budget_utilization, 80);
        assert_eq!(metrics.average_progress, 47);
        assert_eq!(metrics.headline_health, Some(HealthStatus::Warning));
        assert_eq!(metrics.remaining_budget(), 800.0);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = DashboardMetrics::compute(&[]);
        assert_eq!(metrics.total_projects, 0);
        assert_eq!(metrics.budget_utilization, 0);
        assert_eq!(metrics.headline_health, None);
    }
}
