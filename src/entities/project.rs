//! Project entity type - a municipal development project

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::phase::Phase;
use crate::entities::resource::Resource;
use crate::entities::ValidationError;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub fn all() -> &'static [ProjectStatus] {
        &[
            ProjectStatus::Planned,
            ProjectStatus::Active,
            ProjectStatus::OnHold,
            ProjectStatus::Completed,
        ]
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Planned => write!(f, "planned"),
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::OnHold => write!(f, "on_hold"),
            ProjectStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(ProjectStatus::Planned),
            "active" => Ok(ProjectStatus::Active),
            "on_hold" | "onhold" | "on-hold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(format!(
                "Invalid project status: {}. Use planned, active, on_hold, or completed",
                s
            )),
        }
    }
}

/// Manually-set qualitative health indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Stable,
    Warning,
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Stable => write!(f, "stable"),
            HealthStatus::Warning => write!(f, "warning"),
            HealthStatus::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable" => Ok(HealthStatus::Stable),
            "warning" => Ok(HealthStatus::Warning),
            "critical" => Ok(HealthStatus::Critical),
            _ => Err(format!(
                "Invalid health status: {}. Use stable, warning, or critical",
                s
            )),
        }
    }
}

/// A project row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub spent: f64,
    #[serde(default)]
    pub health: HealthStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// The editable fields of this project
    pub fn payload(&self) -> ProjectPayload {
        ProjectPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            spent: self.spent,
            health: self.health,
        }
    }

    /// Budget left to spend (negative when overspent)
    pub fn remaining_budget(&self) -> f64 {
        self.budget - self.spent
    }
}

/// Everything a caller supplies when creating a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub spent: f64,
    pub health: HealthStatus,
}

impl ProjectPayload {
    /// Payload with the form defaults (planned, stable, zero budget)
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            status: ProjectStatus::default(),
            start_date,
            end_date,
            budget: 0.0,
            spent: 0.0,
            health: HealthStatus::default(),
        }
    }

    /// Form-level checks run before a payload reaches the store
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Blank("name"));
        }
        for (field, value) in [("budget", self.budget), ("spent", self.spent)] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite(field));
            }
            if value < 0.0 {
                return Err(ValidationError::Negative(field));
            }
        }
        Ok(())
    }

    /// Overlay the fields present in `patch`
    pub fn merge(mut self, patch: &ProjectPatch) -> Self {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(budget) = patch.budget {
            self.budget = budget;
        }
        if let Some(spent) = patch.spent {
            self.spent = spent;
        }
        if let Some(health) = patch.health {
            self.health = health;
        }
        self
    }
}

/// A partial project update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub spent: Option<f64>,
    pub health: Option<HealthStatus>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A project joined with its phases and resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithRelations {
    #[serde(flatten)]
    pub project: Project,
    pub phases: Vec<Phase>,
    pub resources: Vec<Resource>,
}

impl std::ops::Deref for ProjectWithRelations {
    type Target = Project;

    fn deref(&self) -> &Project {
        &self.project
    }
}
