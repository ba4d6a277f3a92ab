//! Sample municipal projects written into a fresh database

use chrono::{Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::debug;

use super::mutations::{insert_notification, insert_phase, insert_project, insert_resource};
use super::{Store, StoreError};
use crate::entities::{
    HealthStatus, PhasePayload, PhaseStatus, ProjectPayload, ProjectStatus, ResourcePayload,
    Severity,
};

struct SeedPhase {
    name: &'static str,
    start: i64,
    end: i64,
    progress: u8,
    status: PhaseStatus,
}

struct SeedResource {
    name: &'static str,
    kind: &'static str,
    allocation: u8,
}

struct SeedProject {
    name: &'static str,
    description: &'static str,
    status: ProjectStatus,
    start: i64,
    end: i64,
    budget: f64,
    spent: f64,
    health: HealthStatus,
    phases: &'static [SeedPhase],
    resources: &'static [SeedResource],
}

/// Offsets are days relative to the seed day
const PROJECTS: &[SeedProject] = &[
    SeedProject {
        name: "تأهيل الطريق الدائري الشمالي",
        description: "إعادة رصف وتوسعة الطريق الدائري الشمالي مع تحسين الإنارة",
        status: ProjectStatus::Active,
        start: -120,
        end: 150,
        budget: 4_500_000.0,
        spent: 2_100_000.0,
        health: HealthStatus::Stable,
        phases: &[
            SeedPhase {
                name: "المسح والتصميم",
                start: -120,
                end: -60,
                progress: 100,
                status: PhaseStatus::OnTrack,
            },
            SeedPhase {
                name: "أعمال الرصف",
                start: -60,
                end: 5,
                progress: 70,
                status: PhaseStatus::AtRisk,
            },
            SeedPhase {
                name: "الإنارة والتشجير",
                start: 5,
                end: 150,
                progress: 0,
                status: PhaseStatus::OnTrack,
            },
        ],
        resources: &[
            SeedResource {
                name: "فريق الطرق",
                kind: "team",
                allocation: 80,
            },
            SeedResource {
                name: "معدات الرصف",
                kind: "equipment",
                allocation: 60,
            },
        ],
    },
    SeedProject {
        name: "حديقة الحي المركزي",
        description: "إنشاء حديقة عامة مع ممرات مشاة وملاعب أطفال",
        status: ProjectStatus::Active,
        start: -90,
        end: 90,
        budget: 1_200_000.0,
        spent: 1_050_000.0,
        health: HealthStatus::Warning,
        phases: &[
            SeedPhase {
                name: "تسوية الموقع",
                start: -90,
                end: -30,
                progress: 100,
                status: PhaseStatus::OnTrack,
            },
            SeedPhase {
                name: "الزراعة والري",
                start: -30,
                end: 12,
                progress: 45,
                status: PhaseStatus::Delayed,
            },
        ],
        resources: &[SeedResource {
            name: "مقاول التشجير",
            kind: "contractor",
            allocation: 100,
        }],
    },
    SeedProject {
        name: "توسعة شبكة المياه",
        description: "مد خطوط مياه جديدة للأحياء الشرقية",
        status: ProjectStatus::OnHold,
        start: -45,
        end: 240,
        budget: 6_800_000.0,
        spent: 900_000.0,
        health: HealthStatus::Critical,
        phases: &[
            SeedPhase {
                name: "الدراسة الهيدروليكية",
                start: -45,
                end: 25,
                progress: 60,
                status: PhaseStatus::AtRisk,
            },
            SeedPhase {
                name: "مد الأنابيب",
                start: 25,
                end: 240,
                progress: 0,
                status: PhaseStatus::OnTrack,
            },
        ],
        resources: &[
            SeedResource {
                name: "مهندسو المياه",
                kind: "team",
                allocation: 40,
            },
            SeedResource {
                name: "حفارات",
                kind: "equipment",
                allocation: 20,
            },
        ],
    },
    SeedProject {
        name: "المكتبة العامة",
        description: "ترميم مبنى المكتبة العامة وتجهيز قاعة رقمية",
        status: ProjectStatus::Completed,
        start: -300,
        end: -20,
        budget: 850_000.0,
        spent: 830_000.0,
        health: HealthStatus::Stable,
        phases: &[],
        resources: &[SeedResource {
            name: "فريق المباني",
            kind: "team",
            allocation: 10,
        }],
    },
];

const NOTIFICATIONS: &[(usize, &str, Severity, i64)] = &[
    (1, "تجاوز الإنفاق ٨٥٪ من ميزانية حديقة الحي المركزي", Severity::Danger, 0),
    (0, "مرحلة أعمال الرصف تقترب من موعد التسليم", Severity::Warning, 1),
    (2, "تم تعليق توسعة شبكة المياه بانتظار الموافقات", Severity::Warning, 2),
    (3, "اكتمل ترميم المكتبة العامة", Severity::Info, 20),
];

fn offset(day: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        day.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        day.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(day)
}

impl Store {
    /// Insert the sample projects, phases, resources and notifications
    pub(super) fn seed(&mut self, today: NaiveDate) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let noon = Utc.from_utc_datetime(&today.and_time(NaiveTime::default())) + Duration::hours(12);

        let mut project_ids = Vec::with_capacity(PROJECTS.len());
        for seed in PROJECTS {
            let payload = ProjectPayload {
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                status: seed.status,
                start_date: offset(today, seed.start),
                end_date: offset(today, seed.end),
                budget: seed.budget,
                spent: seed.spent,
                health: seed.health,
            };
            let project_id = insert_project(&tx, &payload, noon)?;

            for phase in seed.phases {
                let payload = PhasePayload {
                    name: phase.name.to_string(),
                    start_date: offset(today, phase.start),
                    end_date: offset(today, phase.end),
                    progress: phase.progress,
                    status: phase.status,
                };
                insert_phase(&tx, &project_id, &payload)?;
            }
            for resource in seed.resources {
                let payload = ResourcePayload {
                    name: resource.name.to_string(),
                    resource_type: resource.kind.to_string(),
                    allocation: resource.allocation,
                };
                insert_resource(&tx, &project_id, &payload)?;
            }
            project_ids.push(project_id);
        }

        for &(project, message, severity, days_ago) in NOTIFICATIONS {
            let at = noon - Duration::days(days_ago);
            let project_id = project_ids.get(project).map(String::as_str);
            insert_notification(&tx, project_id, message, severity, at)?;
        }

        tx.commit()?;
        debug!(
            projects = PROJECTS.len(),
            notifications = NOTIFICATIONS.len(),
            "seeded sample data"
        );
        Ok(())
    }
}
