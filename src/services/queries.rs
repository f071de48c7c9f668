//! Read model: role-scoped views derived on demand
//!
//! Nothing here mutates state; every view is recomputed from the store
//! at query time. "Overdue" in particular is a derived label, computed
//! against the timestamp the caller passes in.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Actor, EquipmentStatus, EquipmentUnit, Loan, Notification, Role, User},
    store::Store,
};

/// Labeled count for aggregation views
#[derive(Debug, Clone, Serialize)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn Store>,
}

impl QueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Equipment a student can request: available status and at least
    /// one free unit
    pub async fn available_equipment(&self) -> AppResult<Vec<EquipmentUnit>> {
        let mut units: Vec<EquipmentUnit> = self
            .store
            .equipment()
            .await?
            .into_iter()
            .filter(|u| u.status == EquipmentStatus::Available && u.available_quantity > 0)
            .collect();
        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }

    /// Loans visible to an actor: admins see all, teachers see their
    /// students' loans, students see their own
    pub async fn loans_for(&self, actor: &Actor) -> AppResult<Vec<Loan>> {
        let mut loans = self.store.loans().await?;
        match actor.role {
            Role::Admin => {}
            Role::Teacher => {
                let users = self.store.users().await?;
                let supervised: Vec<Uuid> = users
                    .iter()
                    .filter(|u| u.teacher_id == Some(actor.id))
                    .map(|u| u.id)
                    .collect();
                loans.retain(|l| {
                    l.teacher_id == Some(actor.id) || supervised.contains(&l.user_id)
                });
            }
            Role::Student => loans.retain(|l| l.user_id == actor.id),
        }
        loans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(loans)
    }

    /// Loans still out past their preferred end date, as of the given
    /// instant. Includes loans with a pending return request: the
    /// equipment is still with the borrower.
    pub async fn overdue_loans(&self, as_of: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        let mut loans: Vec<Loan> = self
            .store
            .loans()
            .await?
            .into_iter()
            .filter(|l| l.is_overdue(as_of))
            .collect();
        loans.sort_by(|a, b| a.preferred_end_date.cmp(&b.preferred_end_date));
        Ok(loans)
    }

    /// Loan counts per equipment unit for loans created within the range
    pub async fn equipment_usage_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<StatEntry>> {
        let loans = self.store.loans().await?;
        let equipment = self.store.equipment().await?;
        let names: HashMap<Uuid, String> =
            equipment.into_iter().map(|u| (u.id, u.name)).collect();

        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for loan in loans {
            if loan.created_at >= start && loan.created_at <= end {
                *counts.entry(loan.equipment_id).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<StatEntry> = counts
            .into_iter()
            .map(|(id, value)| StatEntry {
                label: names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
                value,
            })
            .collect();
        entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        Ok(entries)
    }

    /// Loan counts per borrower for loans created within the range
    pub async fn student_activity_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<StatEntry>> {
        let loans = self.store.loans().await?;
        let users = self.store.users().await?;
        let names: HashMap<Uuid, String> = users.into_iter().map(|u| (u.id, u.name)).collect();

        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for loan in loans {
            if loan.created_at >= start && loan.created_at <= end {
                *counts.entry(loan.user_id).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<StatEntry> = counts
            .into_iter()
            .map(|(id, value)| StatEntry {
                label: names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
                value,
            })
            .collect();
        entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        Ok(entries)
    }

    /// Unread notifications for the badge counter, newest first
    pub async fn unread_notifications(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        Ok(self
            .store
            .notifications_for(user_id)
            .await?
            .into_iter()
            .filter(|n| !n.is_read)
            .collect())
    }

    /// Resolve a loan's borrower for display joins
    pub async fn borrower_of(&self, loan: &Loan) -> AppResult<User> {
        self.store.get_user(loan.user_id).await
    }
}
