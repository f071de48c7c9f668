//! Access policy: role-and-ownership gate consulted before every transition

use tracing::warn;

use crate::{
    error::{AppError, AppResult},
    models::{Actor, Loan, Role},
};
use uuid::Uuid;

/// Loan transition kinds the policy rules on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanAction {
    Create,
    Approve,
    Reject,
    RequestReturn,
    ProcessReturn,
}

impl LoanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanAction::Create => "create",
            LoanAction::Approve => "approve",
            LoanAction::Reject => "reject",
            LoanAction::RequestReturn => "request_return",
            LoanAction::ProcessReturn => "process_return",
        }
    }
}

impl std::fmt::Display for LoanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct AccessPolicy;

impl AccessPolicy {
    /// Only active students may open loan requests
    pub fn can_create(actor: &Actor) -> bool {
        actor.role == Role::Student && actor.is_active
    }

    /// `borrower_teacher_id` is the borrower's supervising teacher,
    /// resolved by the caller (denormalized relation, no referential
    /// integrity assumed).
    pub fn can_transition(
        actor: &Actor,
        loan: &Loan,
        borrower_teacher_id: Option<Uuid>,
        action: LoanAction,
    ) -> bool {
        match action {
            LoanAction::Create => Self::can_create(actor),
            LoanAction::Approve | LoanAction::Reject | LoanAction::ProcessReturn => {
                match actor.role {
                    Role::Admin => true,
                    Role::Teacher => {
                        loan.teacher_id == Some(actor.id)
                            || borrower_teacher_id == Some(actor.id)
                    }
                    Role::Student => false,
                }
            }
            LoanAction::RequestReturn => actor.id == loan.user_id,
        }
    }

    /// Deny results are reported, never silently ignored
    pub fn authorize(
        actor: &Actor,
        loan: &Loan,
        borrower_teacher_id: Option<Uuid>,
        action: LoanAction,
    ) -> AppResult<()> {
        if Self::can_transition(actor, loan, borrower_teacher_id, action) {
            Ok(())
        } else {
            warn!(actor = %actor.id, role = %actor.role, loan = %loan.id, %action, "transition denied");
            Err(AppError::Forbidden(format!(
                "{} {} may not {} loan {}",
                actor.role, actor.id, action, loan.id
            )))
        }
    }

    pub fn authorize_create(actor: &Actor) -> AppResult<()> {
        if Self::can_create(actor) {
            Ok(())
        } else {
            warn!(actor = %actor.id, role = %actor.role, "loan creation denied");
            Err(AppError::Forbidden(format!(
                "{} {} may not create loan requests",
                actor.role, actor.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateLoanRequest, LoanStatus};
    use chrono::{Duration, Utc};

    fn actor(role: Role, teacher_id: Option<Uuid>) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            teacher_id,
            is_active: true,
        }
    }

    fn loan(user_id: Uuid, teacher_id: Option<Uuid>) -> Loan {
        let now = Utc::now();
        let req = CreateLoanRequest {
            equipment_id: Uuid::new_v4(),
            teacher_id,
            preferred_start_date: now + Duration::days(1),
            preferred_end_date: now + Duration::days(5),
            purpose: "test".into(),
            notes: None,
        };
        Loan {
            id: Uuid::new_v4(),
            user_id,
            equipment_id: req.equipment_id,
            teacher_id: req.teacher_id,
            status: LoanStatus::Pending,
            request_date: now,
            preferred_start_date: req.preferred_start_date,
            preferred_end_date: req.preferred_end_date,
            expected_return_date: req.preferred_end_date,
            approved_date: None,
            actual_start_date: None,
            actual_end_date: None,
            return_date: None,
            return_request_date: None,
            purpose: req.purpose,
            notes: None,
            return_notes: None,
            equipment_condition_on_return: None,
            equipment_condition_notes: None,
            approved_by: None,
            return_processed_by: None,
            return_approved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_may_approve_any_loan() {
        let admin = actor(Role::Admin, None);
        let l = loan(Uuid::new_v4(), None);
        assert!(AccessPolicy::can_transition(&admin, &l, None, LoanAction::Approve));
        assert!(AccessPolicy::can_transition(&admin, &l, None, LoanAction::ProcessReturn));
    }

    #[test]
    fn teacher_needs_supervision_link() {
        let teacher = actor(Role::Teacher, None);
        let unrelated = loan(Uuid::new_v4(), None);
        assert!(!AccessPolicy::can_transition(
            &teacher,
            &unrelated,
            None,
            LoanAction::Approve
        ));

        // Linked via the loan's own teacher_id
        let own = loan(Uuid::new_v4(), Some(teacher.id));
        assert!(AccessPolicy::can_transition(&teacher, &own, None, LoanAction::Approve));

        // Linked via the borrower's supervising teacher
        let by_borrower = loan(Uuid::new_v4(), None);
        assert!(AccessPolicy::can_transition(
            &teacher,
            &by_borrower,
            Some(teacher.id),
            LoanAction::Reject
        ));
    }

    #[test]
    fn only_borrower_may_request_return() {
        let student = actor(Role::Student, None);
        let own = loan(student.id, None);
        let other = loan(Uuid::new_v4(), None);
        assert!(AccessPolicy::can_transition(&student, &own, None, LoanAction::RequestReturn));
        assert!(!AccessPolicy::can_transition(
            &student,
            &other,
            None,
            LoanAction::RequestReturn
        ));
        // Even an admin may not request a return on someone else's behalf
        let admin = actor(Role::Admin, None);
        assert!(!AccessPolicy::can_transition(&admin, &own, None, LoanAction::RequestReturn));
    }

    #[test]
    fn only_active_students_may_create() {
        assert!(AccessPolicy::can_create(&actor(Role::Student, None)));
        assert!(!AccessPolicy::can_create(&actor(Role::Teacher, None)));
        assert!(!AccessPolicy::can_create(&actor(Role::Admin, None)));
        let mut inactive = actor(Role::Student, None);
        inactive.is_active = false;
        assert!(!AccessPolicy::can_create(&inactive));
    }

    #[test]
    fn students_never_approve() {
        let student = actor(Role::Student, None);
        let own = loan(student.id, None);
        assert!(!AccessPolicy::can_transition(&student, &own, None, LoanAction::Approve));
        assert!(AccessPolicy::authorize(&student, &own, None, LoanAction::Approve).is_err());
    }
}
