//! Equipment unit model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::enums::{EquipmentCondition, EquipmentStatus};

/// An inventory record for one or more interchangeable physical items
///
/// `available_quantity` is the only contended field: it moves down by
/// exactly one on loan approval and up by exactly one on return
/// processing, always inside the same atomic commit as the loan write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentUnit {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub code: Option<String>,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub status: EquipmentStatus,
    pub condition: EquipmentCondition,
    pub total_quantity: u32,
    pub available_quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request (inventory management, outside the loan core)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub code: Option<String>,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 1, message = "Total quantity must be positive"))]
    pub total_quantity: u32,
    /// Defaults to `total_quantity` when omitted
    pub available_quantity: Option<u32>,
    pub condition: Option<EquipmentCondition>,
}

impl EquipmentUnit {
    pub fn new(req: CreateEquipment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            code: req.code,
            category: req.category,
            brand: req.brand,
            model: req.model,
            serial_number: req.serial_number,
            location: req.location,
            status: EquipmentStatus::Available,
            condition: req.condition.unwrap_or(EquipmentCondition::Good),
            available_quantity: req.available_quantity.unwrap_or(req.total_quantity),
            total_quantity: req.total_quantity,
            created_at: now,
            updated_at: now,
        }
    }
}
