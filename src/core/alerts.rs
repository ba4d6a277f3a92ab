//! Alerts panel: upcoming phase deadlines and recent notifications

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{Notification, Phase, ProjectWithRelations, Severity};

/// Deadlines closer than this many days are flagged as danger
const DANGER_DAYS: i64 = 7;

/// Whole days from `today` until `date` (negative when past)
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// How pressing an upcoming deadline is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Warning,
    Danger,
}

impl Urgency {
    pub fn for_days(days: i64) -> Self {
        if days < DANGER_DAYS {
            Urgency::Danger
        } else {
            Urgency::Warning
        }
    }

    /// The notification severity used to label this urgency
    pub fn severity(self) -> Severity {
        match self {
            Urgency::Warning => Severity::Warning,
            Urgency::Danger => Severity::Danger,
        }
    }
}

/// A phase ending inside the deadline window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline<'a> {
    pub project_id: &'a str,
    pub project_name: &'a str,
    pub phase: &'a Phase,
    pub days_left: i64,
    pub urgency: Urgency,
}

/// Phases ending within `window` days of `today`, soonest first
///
/// Phases already past their end date are not included.
pub fn upcoming_deadlines<'a>(
    projects: &'a [ProjectWithRelations],
    today: NaiveDate,
    window: i64,
    limit: usize,
) -> Vec<Deadline<'a>> {
    let mut deadlines: Vec<Deadline<'a>> = projects
        .iter()
        .flat_map(|project| {
            project.phases.iter().filter_map(move |phase| {
                let days_left = days_until(phase.end_date, today);
                (0..=window).contains(&days_left).then(|| Deadline {
                    project_id: &project.id,
                    project_name: &project.name,
                    phase,
                    days_left,
                    urgency: Urgency::for_days(days_left),
                })
            })
        })
        .collect();

    deadlines.sort_by_key(|d| d.days_left);
    deadlines.truncate(limit);
    deadlines
}

/// The newest `limit` notifications from an already newest-first list
pub fn recent_notifications(notifications: &[Notification], limit: usize) -> &[Notification] {
    &notifications[..notifications.len().min(limit)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PhaseStatus, Project};
    use chrono::{Duration, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        date("2025-03-12")
    }

    fn project_with_phase_ends(name: &str, ends_in: &[i64]) -> ProjectWithRelations {
        let now = Utc::now();
        ProjectWithRelations {
            phases: ends_in
                .iter()
                .enumerate()
                .map(|(i, days)| Phase {
                    id: format!("PHS-{}-{}", name, i),
                    project_id: format!("PRJ-{}", name),
                    name: format!("{} phase {}", name, i),
                    start_date: today() - Duration::days(60),
                    end_date: today() + Duration::days(*days),
                    progress: 50,
                    status: PhaseStatus::OnTrack,
                })
                .collect(),
            resources: Vec::new(),
            project: Project {
                id: format!("PRJ-{}", name),
                name: name.to_string(),
                description: String::new(),
                status: Default::default(),
                start_date: today(),
                end_date: today(),
                budget: 0.0,
                spent: 0.0,
                health: Default::default(),
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn test_days_until() {
        assert_eq!(days_until(date("2025-03-15"), today()), 3);
        assert_eq!(days_until(today(), today()), 0);
        assert_eq!(days_until(date("2025-03-10"), today()), -2);
    }

    #[test]
    fn test_urgency_threshold() {
        assert_eq!(Urgency::for_days(0), Urgency::Danger);
        assert_eq!(Urgency::for_days(6), Urgency::Danger);
        assert_eq!(Urgency::for_days(7), Urgency::Warning);
        assert_eq!(Urgency::Danger.severity(), Severity::Danger);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let projects = vec![project_with_phase_ends("roads", &[-1, 0, 30, 31])];
        let deadlines = upcoming_deadlines(&projects, today(), 30, 5);
        let days: Vec<_> = deadlines.iter().map(|d| d.days_left).collect();
        assert_eq!(days, [0, 30]);
    }

    #[test]
    fn test_sorted_across_projects_and_limited() {
        let projects = vec![
            project_with_phase_ends("roads", &[20, 3]),
            project_with_phase_ends("parks", &[10, 1, 25]),
            project_with_phase_ends("water", &[15]),
        ];
        let deadlines = upcoming_deadlines(&projects, today(), 30, 5);

        let days: Vec<_> = deadlines.iter().map(|d| d.days_left).collect();
        assert_eq!(days, [1, 3, 10, 15, 20]);
        assert_eq!(deadlines[0].project_name, "parks");
        assert_eq!(deadlines[0].urgency, Urgency::Danger);
        assert_eq!(deadlines[2].urgency, Urgency::Warning);
    }

    #[test]
    fn test_ties_keep_project_order() {
        let projects = vec![
            project_with_phase_ends("roads", &[4]),
            project_with_phase_ends("parks", &[4]),
        ];
        let deadlines = upcoming_deadlines(&projects, today(), 30, 5);
        assert_eq!(deadlines[0].project_name, "roads");
        assert_eq!(deadlines[1].project_name, "parks");
    }

    #[test]
    fn test_recent_notifications_limit() {
        let now = Utc::now();
        let notifications: Vec<_> = (0..8)
            .map(|i| Notification {
                id: format!("NTF-{}", i),
                project_id: None,
                message: format!("message {}", i),
                severity: Severity::Info,
                created_at: now - Duration::minutes(i),
                is_read: false,
            })
            .collect();

        assert_eq!(recent_notifications(&notifications, 6).len(), 6);
        assert_eq!(recent_notifications(&notifications, 6)[0].id, "NTF-0");
        assert_eq!(recent_notifications(&notifications[..2], 6).len(), 2);
    }
}
