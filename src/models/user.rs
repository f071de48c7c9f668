//! User model and the actor view supplied by the identity provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Role;

/// User record as stored by the surrounding application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Supervising teacher, set for students only
    pub teacher_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Authenticated identity performing an operation
///
/// The core trusts this object as given; producing it is the identity
/// provider's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub teacher_id: Option<Uuid>,
    pub is_active: bool,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
            teacher_id: self.teacher_id,
            is_active: self.is_active,
        }
    }
}
