//! Notification record emitted alongside loan transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NotificationType;

/// A notification request persisted in the same atomic unit as the
/// transition that produced it. Delivery and rendering are external.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_loan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        related_loan_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            is_read: false,
            related_loan_id,
            created_at: Utc::now(),
        }
    }
}
