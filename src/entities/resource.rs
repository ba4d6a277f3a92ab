//! Resource entity type - staff, equipment or contractors assigned to a project

use serde::{Deserialize, Serialize};

use crate::entities::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub project_id: String,
    pub name: String,
    /// Free-text kind (e.g. "team", "equipment", "contractor")
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Share of the resource assigned to the project, 0-100
    pub allocation: u8,
}

impl Resource {
    pub fn payload(&self) -> ResourcePayload {
        ResourcePayload {
            name: self.name.clone(),
            resource_type: self.resource_type.clone(),
            allocation: self.allocation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub allocation: u8,
}

impl ResourcePayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Blank("name"));
        }
        if self.allocation > 100 {
            return Err(ValidationError::OutOfRange {
                field: "allocation",
                value: self.allocation.into(),
            });
        }
        Ok(())
    }

    pub fn merge(mut self, patch: &ResourcePatch) -> Self {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref kind) = patch.resource_type {
            self.resource_type = kind.clone();
        }
        if let Some(allocation) = patch.allocation {
            self.allocation = allocation;
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePatch {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    pub allocation: Option<u8>,
}

impl ResourcePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
