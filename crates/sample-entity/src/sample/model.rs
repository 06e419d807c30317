//! Sample entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use sample_core::traits::entity::{BASE_FIELDS, Entity};
use sample_core::types::value::FieldValue;

/// A sample record managed through the repository stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Sample {
    /// Unique identifier. Nil until the repository assigns one.
    pub id: Uuid,
    /// Creation time (Unix seconds).
    pub created_at: i64,
    /// Last update time (Unix seconds).
    pub updated_at: Option<i64>,
    /// Soft-delete time. `None` or `0` means live.
    pub deleted_at: Option<i64>,
    /// Display name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

impl Sample {
    /// A new, not yet persisted sample.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            created_at: 0,
            updated_at: None,
            deleted_at: None,
            name: Some(name.into()),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Entity for Sample {
    const NAME: &'static str = "Sample";
    const TABLE: &'static str = "samples";
    const FIELDS: &'static [&'static str] = &[
        BASE_FIELDS[0],
        BASE_FIELDS[1],
        BASE_FIELDS[2],
        BASE_FIELDS[3],
        "name",
        "description",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn set_created_at(&mut self, ts: i64) {
        self.created_at = ts;
    }

    fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    fn set_updated_at(&mut self, ts: Option<i64>) {
        self.updated_at = ts;
    }

    fn deleted_at(&self) -> Option<i64> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, ts: Option<i64>) {
        self.deleted_at = ts;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(self.name.clone().into()),
            "description" => Some(self.description.clone().into()),
            _ => self.base_field(name),
        }
    }

    fn merge_from(&mut self, incoming: &Self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if merge_option(&mut self.name, &incoming.name) {
            changed.push("name");
        }
        if merge_option(&mut self.description, &incoming.description) {
            changed.push("description");
        }
        changed
    }
}

fn merge_option<V: Clone + PartialEq>(stored: &mut Option<V>, incoming: &Option<V>) -> bool {
    match incoming {
        Some(value) if stored.as_ref() != Some(value) => {
            *stored = Some(value.clone());
            true
        }
        _ => false,
    }
}

/// Data required to create a new sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSample {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl From<CreateSample> for Sample {
    fn from(input: CreateSample) -> Self {
        Self {
            description: input.description,
            ..Sample::new(input.name)
        }
    }
}

/// Partial update of an existing sample. `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSample {
    /// Target sample.
    pub id: Uuid,
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl From<UpdateSample> for Sample {
    fn from(input: UpdateSample) -> Self {
        Self {
            id: input.id,
            created_at: 0,
            updated_at: None,
            deleted_at: None,
            name: input.name,
            description: input.description,
        }
    }
}
