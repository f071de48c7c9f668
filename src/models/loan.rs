//! Loan model and transition request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::enums::{LoanStatus, ReturnCondition};

/// A single borrowing transaction from request through return
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    /// Borrower (role=student expected)
    pub user_id: Uuid,
    pub equipment_id: Uuid,
    /// Supervising teacher, fixed at creation
    pub teacher_id: Option<Uuid>,
    pub status: LoanStatus,
    pub request_date: DateTime<Utc>,
    pub preferred_start_date: DateTime<Utc>,
    pub preferred_end_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub approved_date: Option<DateTime<Utc>>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_end_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub return_request_date: Option<DateTime<Utc>>,
    pub purpose: String,
    pub notes: Option<String>,
    pub return_notes: Option<String>,
    pub equipment_condition_on_return: Option<ReturnCondition>,
    pub equipment_condition_notes: Option<String>,
    pub approved_by: Option<Uuid>,
    pub return_processed_by: Option<Uuid>,
    pub return_approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Overdue is a derived label, never a stored status. A loan is
    /// overdue while the equipment is still out (including a pending
    /// return request) past its preferred end date.
    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        (self.status.is_out() || self.status == LoanStatus::ReturnRequested)
            && self.preferred_end_date < as_of
    }
}

/// Create loan request, submitted by a student
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub equipment_id: Uuid,
    /// Overrides the borrower's own supervising teacher when set
    pub teacher_id: Option<Uuid>,
    pub preferred_start_date: DateTime<Utc>,
    pub preferred_end_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
    pub notes: Option<String>,
}

/// Return processing request, submitted by an admin or owning teacher
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReturnRequest {
    /// Required; `damaged` forces the equipment status to `damaged`
    pub condition: Option<ReturnCondition>,
    /// Route the unit to maintenance instead of back to `available`
    /// (ignored when the condition is `damaged`)
    #[serde(default)]
    pub requires_maintenance: bool,
    pub return_notes: Option<String>,
    pub condition_notes: Option<String>,
}
