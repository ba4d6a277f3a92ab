//! Phase entity type - a scheduled stage of a project

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::ValidationError;

/// Schedule status of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    OnTrack,
    AtRisk,
    Delayed,
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseStatus::OnTrack => write!(f, "on_track"),
            PhaseStatus::AtRisk => write!(f, "at_risk"),
            PhaseStatus::Delayed => write!(f, "delayed"),
        }
    }
}

impl std::str::FromStr for PhaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on_track" | "ontrack" | "on-track" => Ok(PhaseStatus::OnTrack),
            "at_risk" | "atrisk" | "at-risk" => Ok(PhaseStatus::AtRisk),
            "delayed" => Ok(PhaseStatus::Delayed),
            _ => Err(format!(
                "Invalid phase status: {}. Use on_track, at_risk, or delayed",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Completion percentage, 0-100
    pub progress: u8,
    pub status: PhaseStatus,
}

impl Phase {
    pub fn payload(&self) -> PhasePayload {
        PhasePayload {
            name: self.name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            progress: self.progress,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasePayload {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: u8,
    pub status: PhaseStatus,
}

impl PhasePayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Blank("name"));
        }
        if self.progress > 100 {
            return Err(ValidationError::OutOfRange {
                field: "progress",
                value: self.progress.into(),
            });
        }
        Ok(())
    }

    pub fn merge(mut self, patch: &PhasePatch) -> Self {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhasePatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub status: Option<PhaseStatus>,
}

impl PhasePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(progress: u8) -> PhasePayload {
        PhasePayload {
            name: "Excavation".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            progress,
            status: PhaseStatus::OnTrack,
        }
    }

    #[test]
    fn test_phase_status_aliases() {
        assert_eq!("at-risk".parse::<PhaseStatus>().unwrap(), PhaseStatus::AtRisk);
        assert_eq!(PhaseStatus::Delayed.to_string(), "delayed");
        assert!("late".parse::<PhaseStatus>().is_err());
    }

    #[test]
    fn test_progress_above_hundred_is_rejected() {
        assert!(payload(100).validate().is_ok());
        assert!(matches!(
            payload(101).validate(),
            Err(ValidationError::OutOfRange { field: "progress", value: 101 })
        ));
    }

    #[test]
    fn test_merge_updates_progress() {
        let merged = payload(10).merge(&PhasePatch {
            progress: Some(75),
            status: Some(PhaseStatus::AtRisk),
            ..Default::default()
        });
        assert_eq!(merged.progress, 75);
        assert_eq!(merged.status, PhaseStatus::AtRisk);
        assert_eq!(merged.name, "Excavation");
    }
}
