//! Loan lifecycle service
//!
//! Owns the per-loan status field and the legal transition table. Every
//! transition is one atomic commit covering the loan write, the
//! equipment-availability adjustment and the notification inserts;
//! version guards turn lost races into `Conflict` for the caller to
//! retry with fresh data.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Actor, CreateLoanRequest, Loan, LoanStatus, ProcessReturnRequest, Role},
    services::{
        ledger::EquipmentLedger,
        notifications,
        policy::{AccessPolicy, LoanAction},
    },
    store::{Store, Transaction},
};

#[derive(Clone)]
pub struct LoanService {
    store: Arc<dyn Store>,
}

impl LoanService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Open a loan request. The loan starts `pending`; availability is
    /// only checked for eligibility here, the decrement happens at
    /// approval.
    pub async fn create(&self, actor: &Actor, req: CreateLoanRequest) -> AppResult<Loan> {
        AccessPolicy::authorize_create(actor)?;
        req.validate()?;

        if req.preferred_end_date <= req.preferred_start_date {
            return Err(AppError::Validation(
                "preferredEndDate must be after preferredStartDate".into(),
            ));
        }
        let today = Utc::now().date_naive();
        if req.preferred_start_date.date_naive() < today {
            return Err(AppError::Validation(
                "preferredStartDate must not be in the past".into(),
            ));
        }

        let borrower = self.store.get_user(actor.id).await?;
        let equipment = self.store.get_equipment(req.equipment_id).await?;
        if equipment.value.available_quantity == 0 {
            return Err(AppError::Conflict(format!(
                "Equipment {} has no available units",
                equipment.value.id
            )));
        }

        let now = Utc::now();
        let loan = Loan {
            id: Uuid::new_v4(),
            user_id: borrower.id,
            equipment_id: req.equipment_id,
            teacher_id: req.teacher_id.or(borrower.teacher_id),
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
            notes: req.notes,
            return_notes: None,
            equipment_condition_on_return: None,
            equipment_condition_notes: None,
            approved_by: None,
            return_processed_by: None,
            return_approved_by: None,
            created_at: now,
            updated_at: now,
        };

        let users = self.store.users().await?;
        let reviewers = notifications::resolve_reviewers(&loan, &borrower, &users);
        let notices = notifications::loan_requested(
            &loan,
            &equipment.value.name,
            &borrower.name,
            &reviewers,
        );

        let mut tx = Transaction::default();
        tx.insert_loan(loan.clone()).notify(notices);
        self.store.commit(tx).await?;

        info!(loan = %loan.id, borrower = %borrower.id, equipment = %loan.equipment_id, "loan requested");
        Ok(loan)
    }

    /// Approve a pending loan: the one transition that decrements
    /// availability. Quantity is re-checked here and guarded by the
    /// equipment version, so concurrent approvals of the last unit
    /// cannot both succeed.
    pub async fn approve(&self, actor: &Actor, loan_id: Uuid) -> AppResult<Loan> {
        let stored = self.store.get_loan(loan_id).await?;
        let borrower = self.store.get_user(stored.value.user_id).await?;
        AccessPolicy::authorize(actor, &stored.value, borrower.teacher_id, LoanAction::Approve)?;

        if stored.value.status != LoanStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Cannot approve loan {} in status {}",
                loan_id, stored.value.status
            )));
        }

        let equipment = self.store.get_equipment(stored.value.equipment_id).await?;
        if equipment.value.available_quantity == 0 {
            return Err(AppError::Conflict(format!(
                "Equipment {} has no available units",
                equipment.value.id
            )));
        }
        let adjusted = EquipmentLedger::adjust_availability(&equipment.value, -1)?;

        let now = Utc::now();
        let mut loan = stored.value.clone();
        loan.status = LoanStatus::Approved;
        loan.approved_date = Some(now);
        loan.approved_by = Some(actor.id);
        loan.actual_start_date = Some(now);
        loan.updated_at = now;

        let notices = notifications::loan_approved(&loan, &equipment.value.name);

        let mut tx = Transaction::default();
        tx.put_loan(stored.version, loan.clone())
            .put_equipment(equipment.version, adjusted)
            .notify(notices);
        self.store.commit(tx).await?;

        info!(loan = %loan.id, approver = %actor.id, "loan approved");
        Ok(loan)
    }

    /// Reject a pending loan. Only legal before approval: there is no
    /// ledger increment path for a rejected-after-approved loan.
    pub async fn reject(
        &self,
        actor: &Actor,
        loan_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Loan> {
        let stored = self.store.get_loan(loan_id).await?;
        let borrower = self.store.get_user(stored.value.user_id).await?;
        AccessPolicy::authorize(actor, &stored.value, borrower.teacher_id, LoanAction::Reject)?;

        if stored.value.status != LoanStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Cannot reject loan {} in status {}",
                loan_id, stored.value.status
            )));
        }

        let now = Utc::now();
        let mut loan = stored.value.clone();
        loan.status = LoanStatus::Rejected;
        if reason.is_some() {
            loan.notes = reason.clone();
        }
        loan.updated_at = now;

        let notices = notifications::loan_rejected(&loan, reason.as_deref());

        let mut tx = Transaction::default();
        tx.put_loan(stored.version, loan.clone()).notify(notices);
        self.store.commit(tx).await?;

        info!(loan = %loan.id, reviewer = %actor.id, "loan rejected");
        Ok(loan)
    }

    /// Borrower asks to hand the equipment back. No ledger effect until
    /// the return is processed.
    pub async fn request_return(&self, actor: &Actor, loan_id: Uuid) -> AppResult<Loan> {
        let stored = self.store.get_loan(loan_id).await?;
        let borrower = self.store.get_user(stored.value.user_id).await?;
        AccessPolicy::authorize(
            actor,
            &stored.value,
            borrower.teacher_id,
            LoanAction::RequestReturn,
        )?;

        if !stored.value.status.is_out() {
            return Err(AppError::InvalidTransition(format!(
                "Cannot request return of loan {} in status {}",
                loan_id, stored.value.status
            )));
        }

        let now = Utc::now();
        let mut loan = stored.value.clone();
        loan.status = LoanStatus::ReturnRequested;
        loan.return_request_date = Some(now);
        loan.updated_at = now;

        let users = self.store.users().await?;
        let reviewers = notifications::resolve_reviewers(&loan, &borrower, &users);
        let notices = notifications::return_requested(&loan, &borrower.name, &reviewers);

        let mut tx = Transaction::default();
        tx.put_loan(stored.version, loan.clone()).notify(notices);
        self.store.commit(tx).await?;

        info!(loan = %loan.id, borrower = %borrower.id, "return requested");
        Ok(loan)
    }

    /// Close out a loan: increments availability, records the reported
    /// condition on the unit and notifies the borrower. Works from
    /// `approved`/`active` directly or from `return_requested`; an
    /// overdue loan is still returnable.
    pub async fn process_return(
        &self,
        actor: &Actor,
        loan_id: Uuid,
        req: ProcessReturnRequest,
    ) -> AppResult<Loan> {
        let stored = self.store.get_loan(loan_id).await?;
        let borrower = self.store.get_user(stored.value.user_id).await?;
        AccessPolicy::authorize(
            actor,
            &stored.value,
            borrower.teacher_id,
            LoanAction::ProcessReturn,
        )?;

        if !stored.value.status.is_out() && stored.value.status != LoanStatus::ReturnRequested {
            return Err(AppError::InvalidTransition(format!(
                "Cannot process return of loan {} in status {}",
                loan_id, stored.value.status
            )));
        }

        let condition = req.condition.ok_or_else(|| {
            AppError::Validation("equipmentConditionOnReturn is required".into())
        })?;

        let equipment = self.store.get_equipment(stored.value.equipment_id).await?;
        let restocked = EquipmentLedger::adjust_availability(&equipment.value, 1)?;
        let restocked =
            EquipmentLedger::apply_return_condition(&restocked, condition, req.requires_maintenance);

        let now = Utc::now();
        let mut loan = stored.value.clone();
        loan.status = LoanStatus::Returned;
        loan.return_date = Some(now);
        loan.actual_end_date = Some(now);
        loan.return_processed_by = Some(actor.id);
        if actor.role == Role::Teacher {
            loan.return_approved_by = Some(actor.id);
        }
        loan.return_notes = req.return_notes;
        loan.equipment_condition_on_return = Some(condition);
        loan.equipment_condition_notes = req.condition_notes;
        loan.updated_at = now;

        let notices = notifications::return_processed(&loan, condition);

        let mut tx = Transaction::default();
        tx.put_loan(stored.version, loan.clone())
            .put_equipment(equipment.version, restocked)
            .notify(notices);
        self.store.commit(tx).await?;

        info!(loan = %loan.id, processor = %actor.id, condition = %condition, "return processed");
        Ok(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockStore;
    use chrono::Duration;

    fn student_actor() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: Role::Student,
            teacher_id: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn approve_propagates_missing_loan() {
        let mut store = MockStore::new();
        store
            .expect_get_loan()
            .returning(|id| Err(AppError::NotFound(format!("Loan {} not found", id))));

        let service = LoanService::new(Arc::new(store));
        let admin = Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
            teacher_id: None,
            is_active: true,
        };
        let err = service.approve(&admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_denies_non_students_before_any_read() {
        // No expectations on the mock: a denied actor must not reach the store
        let store = MockStore::new();
        let service = LoanService::new(Arc::new(store));

        let teacher = Actor {
            id: Uuid::new_v4(),
            role: Role::Teacher,
            teacher_id: None,
            is_active: true,
        };
        let now = Utc::now();
        let req = CreateLoanRequest {
            equipment_id: Uuid::new_v4(),
            teacher_id: None,
            preferred_start_date: now + Duration::days(1),
            preferred_end_date: now + Duration::days(5),
            purpose: "demo".into(),
            notes: None,
        };
        let err = service.create(&teacher, req).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn create_rejects_inverted_dates_before_any_read() {
        let store = MockStore::new();
        let service = LoanService::new(Arc::new(store));

        let now = Utc::now();
        let req = CreateLoanRequest {
            equipment_id: Uuid::new_v4(),
            teacher_id: None,
            preferred_start_date: now + Duration::days(3),
            preferred_end_date: now + Duration::days(3),
            purpose: "demo".into(),
            notes: None,
        };
        let err = service.create(&student_actor(), req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
