//! Entity type definitions
//!
//! The tracker stores four entity types:
//!
//! - [`Project`] - A municipal development project with budget and health
//! - [`Phase`] - A scheduled stage of one project with progress 0-100
//! - [`Resource`] - Staff or equipment allocated to one project (0-100%)
//! - [`Notification`] - A dashboard message, optionally tied to a project

pub mod notification;
pub mod phase;
pub mod project;
pub mod resource;

pub use notification::{Notification, Severity};
pub use phase::{Phase, PhasePatch, PhasePayload, PhaseStatus};
pub use project::{
    HealthStatus, Project, ProjectPatch, ProjectPayload, ProjectStatus, ProjectWithRelations,
};
pub use resource::{Resource, ResourcePatch, ResourcePayload};

use thiserror::Error;

/// Form-level validation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("{field} must be between 0 and 100 (got {value})")]
    OutOfRange { field: &'static str, value: u32 },
}
