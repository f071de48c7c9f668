//! Data models for Equiloan

pub mod enums;
pub mod equipment;
pub mod loan;
pub mod notification;
pub mod user;

// Re-export commonly used types
pub use enums::{
    EquipmentCondition, EquipmentStatus, LoanStatus, NotificationType, ReturnCondition, Role,
};
pub use equipment::{CreateEquipment, EquipmentUnit};
pub use loan::{CreateLoanRequest, Loan, ProcessReturnRequest};
pub use notification::Notification;
pub use user::{Actor, User};
