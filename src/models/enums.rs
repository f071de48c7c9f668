//! Shared domain enums
//!
//! Variant strings are the wire contract with existing stored data and
//! the surrounding application; parsing an unknown string is a hard
//! error, never a silent default.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Loan lifecycle status
///
/// Legal transitions: `pending -> {approved | rejected}`,
/// `approved/active -> {return_requested | returned}`,
/// `return_requested -> returned`. `rejected` and `returned` are
/// terminal. "Overdue" is derived at query time, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Pending,
    Approved,
    Active,
    ReturnRequested,
    Returned,
    Rejected,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Active => "active",
            LoanStatus::ReturnRequested => "return_requested",
            LoanStatus::Returned => "returned",
            LoanStatus::Rejected => "rejected",
        }
    }

    /// Equipment is out with the borrower (the ledger-decremented state).
    /// `approved` and `active` are the same state for every business rule.
    pub fn is_out(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Returned | LoanStatus::Rejected)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LoanStatus::Pending),
            "approved" => Ok(LoanStatus::Approved),
            "active" => Ok(LoanStatus::Active),
            "return_requested" => Ok(LoanStatus::ReturnRequested),
            "returned" => Ok(LoanStatus::Returned),
            "rejected" => Ok(LoanStatus::Rejected),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

/// Equipment unit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Available,
    Loaned,
    Damaged,
    Maintenance,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::Loaned => "loaned",
            EquipmentStatus::Damaged => "damaged",
            EquipmentStatus::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(EquipmentStatus::Available),
            "loaned" => Ok(EquipmentStatus::Loaned),
            "damaged" => Ok(EquipmentStatus::Damaged),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            _ => Err(format!("Invalid equipment status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// EquipmentCondition
// ---------------------------------------------------------------------------

/// Physical condition of an equipment unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl EquipmentCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCondition::Excellent => "excellent",
            EquipmentCondition::Good => "good",
            EquipmentCondition::Fair => "fair",
            EquipmentCondition::Poor => "poor",
        }
    }
}

impl std::fmt::Display for EquipmentCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReturnCondition
// ---------------------------------------------------------------------------

/// Condition reported when a loan is returned
///
/// Extends [`EquipmentCondition`] with `damaged`, which forces the
/// equipment unit's status to `damaged` regardless of any maintenance
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    Damaged,
}

impl ReturnCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnCondition::Excellent => "excellent",
            ReturnCondition::Good => "good",
            ReturnCondition::Fair => "fair",
            ReturnCondition::Poor => "poor",
            ReturnCondition::Damaged => "damaged",
        }
    }

    pub fn is_damaged(&self) -> bool {
        matches!(self, ReturnCondition::Damaged)
    }

    /// Equipment-side condition to record. A damaged return is recorded
    /// as `poor`; the damage itself is carried by the unit's status.
    pub fn equipment_condition(&self) -> EquipmentCondition {
        match self {
            ReturnCondition::Excellent => EquipmentCondition::Excellent,
            ReturnCondition::Good => EquipmentCondition::Good,
            ReturnCondition::Fair => EquipmentCondition::Fair,
            ReturnCondition::Poor | ReturnCondition::Damaged => EquipmentCondition::Poor,
        }
    }
}

impl std::fmt::Display for ReturnCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Actor role as supplied by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

/// Notification kind, mirroring loan transitions plus scheduler notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Pending,
    Approved,
    Rejected,
    ReturnRequest,
    ReturnProcessed,
    ReturnApproved,
    Damaged,
    Overdue,
    Reminder,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Pending => "pending",
            NotificationType::Approved => "approved",
            NotificationType::Rejected => "rejected",
            NotificationType::ReturnRequest => "return_request",
            NotificationType::ReturnProcessed => "return_processed",
            NotificationType::ReturnApproved => "return_approved",
            NotificationType::Damaged => "damaged",
            NotificationType::Overdue => "overdue",
            NotificationType::Reminder => "reminder",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn loan_status_round_trips_wire_strings() {
        for s in [
            "pending",
            "approved",
            "active",
            "return_requested",
            "returned",
            "rejected",
        ] {
            assert_eq!(LoanStatus::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn unknown_loan_status_is_rejected() {
        // "overdue" was a stored status in legacy data; it is derived-only now
        assert!(LoanStatus::from_str("overdue").is_err());
        assert!(LoanStatus::from_str("").is_err());
    }

    #[test]
    fn damaged_return_maps_to_poor_condition() {
        assert!(ReturnCondition::Damaged.is_damaged());
        assert_eq!(
            ReturnCondition::Damaged.equipment_condition(),
            EquipmentCondition::Poor
        );
        assert_eq!(
            ReturnCondition::Good.equipment_condition(),
            EquipmentCondition::Good
        );
    }
}
