//! Notification emitter and read-state service
//!
//! The emitter is a pure mapping from a transition to the notification
//! records to persist; the loan service commits them in the same atomic
//! unit as the loan and equipment writes. Titles and messages are the
//! Spanish strings the surrounding application renders.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Loan, Notification, NotificationType, ReturnCondition, Role, User},
    store::Store,
};

/// Who reviews a loan request: the borrower's supervising teacher when
/// one resolves, otherwise every active admin (never a single arbitrary
/// one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reviewers {
    Teacher(Uuid),
    Admins(Vec<Uuid>),
}

/// Resolve the reviewers for a loan from the loan's own teacher link,
/// the borrower's denormalized teacher link, or the admin roster.
pub fn resolve_reviewers(loan: &Loan, borrower: &User, users: &[User]) -> Reviewers {
    if let Some(teacher_id) = loan.teacher_id.or(borrower.teacher_id) {
        return Reviewers::Teacher(teacher_id);
    }
    Reviewers::Admins(
        users
            .iter()
            .filter(|u| u.role == Role::Admin && u.is_active)
            .map(|u| u.id)
            .collect(),
    )
}

pub fn loan_requested(
    loan: &Loan,
    equipment_name: &str,
    borrower_name: &str,
    reviewers: &Reviewers,
) -> Vec<Notification> {
    let title = "Nueva Solicitud de Préstamo";
    match reviewers {
        Reviewers::Teacher(teacher_id) => vec![Notification::new(
            *teacher_id,
            NotificationType::Pending,
            title,
            format!(
                "Tu estudiante {} ha solicitado el equipo \"{}\". Revisa la solicitud en la página de aprobaciones.",
                borrower_name, equipment_name
            ),
            Some(loan.id),
        )],
        Reviewers::Admins(admin_ids) => admin_ids
            .iter()
            .map(|admin_id| {
                Notification::new(
                    *admin_id,
                    NotificationType::Pending,
                    title,
                    format!(
                        "{} ha solicitado el equipo \"{}\". Revisa la solicitud para aprobar o rechazar.",
                        borrower_name, equipment_name
                    ),
                    Some(loan.id),
                )
            })
            .collect(),
    }
}

pub fn loan_approved(loan: &Loan, equipment_name: &str) -> Vec<Notification> {
    vec![Notification::new(
        loan.user_id,
        NotificationType::Approved,
        "Préstamo Aprobado",
        format!(
            "Tu solicitud de préstamo del equipo \"{}\" ha sido aprobada. Puedes recoger el equipo.",
            equipment_name
        ),
        Some(loan.id),
    )]
}

pub fn loan_rejected(loan: &Loan, reason: Option<&str>) -> Vec<Notification> {
    let message = match reason {
        Some(reason) if !reason.is_empty() => format!(
            "Tu solicitud de préstamo ha sido rechazada. Motivo: {}",
            reason
        ),
        _ => "Tu solicitud de préstamo ha sido rechazada.".to_string(),
    };
    vec![Notification::new(
        loan.user_id,
        NotificationType::Rejected,
        "Préstamo Rechazado",
        message,
        Some(loan.id),
    )]
}

pub fn return_requested(loan: &Loan, borrower_name: &str, reviewers: &Reviewers) -> Vec<Notification> {
    let message = format!(
        "El estudiante {} ha solicitado devolver un equipo. Revisa la solicitud.",
        borrower_name
    );
    let recipients: Vec<Uuid> = match reviewers {
        Reviewers::Teacher(teacher_id) => vec![*teacher_id],
        Reviewers::Admins(admin_ids) => admin_ids.clone(),
    };
    recipients
        .into_iter()
        .map(|recipient| {
            Notification::new(
                recipient,
                NotificationType::ReturnRequest,
                "Solicitud de Devolución",
                message.clone(),
                Some(loan.id),
            )
        })
        .collect()
}

/// Return processing notifies the borrower; a damaged condition adds a
/// separate damage notice.
pub fn return_processed(loan: &Loan, condition: ReturnCondition) -> Vec<Notification> {
    let mut notifications = vec![Notification::new(
        loan.user_id,
        NotificationType::ReturnProcessed,
        "Devolución Procesada",
        format!("Tu devolución ha sido procesada. Estado del equipo: {}", condition),
        Some(loan.id),
    )];
    if condition.is_damaged() {
        notifications.push(Notification::new(
            loan.user_id,
            NotificationType::Damaged,
            "Equipo Dañado",
            "El equipo devuelto presenta daños. Revisa los detalles en tu historial de préstamos.",
            Some(loan.id),
        ));
    }
    notifications
}

/// For an external scheduler polling overdue loans
pub fn overdue_notice(loan: &Loan, equipment_name: &str) -> Notification {
    Notification::new(
        loan.user_id,
        NotificationType::Overdue,
        "Préstamo Vencido",
        format!(
            "El préstamo del equipo \"{}\" ha vencido. Por favor, devuélvelo lo antes posible.",
            equipment_name
        ),
        Some(loan.id),
    )
}

/// For an external scheduler reminding borrowers shortly before the end date
pub fn reminder_notice(loan: &Loan, equipment_name: &str) -> Notification {
    Notification::new(
        loan.user_id,
        NotificationType::Reminder,
        "Recordatorio de Devolución",
        format!(
            "El préstamo del equipo \"{}\" vence pronto. Prepara la devolución.",
            equipment_name
        ),
        Some(loan.id),
    )
}

/// Read-state operations on persisted notifications
#[derive(Clone)]
pub struct NotificationsService {
    store: Arc<dyn Store>,
}

impl NotificationsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        self.store.notifications_for(user_id).await
    }

    pub async fn mark_read(&self, id: Uuid) -> AppResult<()> {
        self.store.mark_notification_read(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateLoanRequest, LoanStatus};
    use chrono::{Duration, Utc};

    fn user(role: Role, teacher_id: Option<Uuid>, active: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "María Pérez".into(),
            email: "maria@example.edu".into(),
            role,
            teacher_id,
            is_active: active,
            created_at: Utc::now(),
        }
    }

    fn pending_loan(borrower: &User) -> Loan {
        let now = Utc::now();
        let req = CreateLoanRequest {
            equipment_id: Uuid::new_v4(),
            teacher_id: None,
            preferred_start_date: now + Duration::days(1),
            preferred_end_date: now + Duration::days(5),
            purpose: "práctica de laboratorio".into(),
            notes: None,
        };
        Loan {
            id: Uuid::new_v4(),
            user_id: borrower.id,
            equipment_id: req.equipment_id,
            teacher_id: None,
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
    fn teacher_takes_precedence_over_admin_fanout() {
        let teacher = user(Role::Teacher, None, true);
        let borrower = user(Role::Student, Some(teacher.id), true);
        let admin = user(Role::Admin, None, true);
        let loan = pending_loan(&borrower);

        let reviewers =
            resolve_reviewers(&loan, &borrower, &[teacher.clone(), admin, borrower.clone()]);
        assert_eq!(reviewers, Reviewers::Teacher(teacher.id));
    }

    #[test]
    fn fanout_hits_every_active_admin() {
        let borrower = user(Role::Student, None, true);
        let admin_a = user(Role::Admin, None, true);
        let admin_b = user(Role::Admin, None, true);
        let inactive_admin = user(Role::Admin, None, false);
        let loan = pending_loan(&borrower);

        let reviewers = resolve_reviewers(
            &loan,
            &borrower,
            &[admin_a.clone(), admin_b.clone(), inactive_admin, borrower.clone()],
        );
        let notifications = loan_requested(&loan, "Laptop Dell", &borrower.name, &reviewers);
        let mut recipients: Vec<Uuid> = notifications.iter().map(|n| n.user_id).collect();
        recipients.sort();
        let mut expected = vec![admin_a.id, admin_b.id];
        expected.sort();
        assert_eq!(recipients, expected);
        assert!(notifications.iter().all(|n| n.kind == NotificationType::Pending));
        assert!(notifications.iter().all(|n| n.related_loan_id == Some(loan.id)));
    }

    #[test]
    fn damaged_return_emits_two_notices() {
        let borrower = user(Role::Student, None, true);
        let loan = pending_loan(&borrower);

        let notifications = return_processed(&loan, ReturnCondition::Damaged);
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].kind, NotificationType::ReturnProcessed);
        assert_eq!(notifications[1].kind, NotificationType::Damaged);
        assert!(notifications.iter().all(|n| n.user_id == borrower.id));

        let clean = return_processed(&loan, ReturnCondition::Good);
        assert_eq!(clean.len(), 1);
    }

    #[test]
    fn rejection_reason_is_included_when_given() {
        let borrower = user(Role::Student, None, true);
        let loan = pending_loan(&borrower);
        let with_reason = loan_rejected(&loan, Some("equipo reservado"));
        assert!(with_reason[0].message.contains("Motivo: equipo reservado"));
        let without = loan_rejected(&loan, None);
        assert!(!without[0].message.contains("Motivo"));
    }
}
