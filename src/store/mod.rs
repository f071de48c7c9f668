//! Abstract persistence contract
//!
//! The core never talks to a concrete database; it reads versioned
//! entities and commits version-guarded write batches through this
//! trait. A loan transition, its equipment adjustment and its
//! notification inserts always travel in one [`Transaction`]: the
//! adapter must apply all of it or none of it, and must fail the whole
//! batch with `Conflict` when any version guard no longer matches.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EquipmentUnit, Loan, Notification, User},
};

pub use memory::{ChangeEvent, MemoryStore};

/// An entity together with the commit version it was read at.
/// Services pass the version back in write guards to express
/// compare-and-swap against concurrent writers.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// One write in an atomic batch
#[derive(Debug, Clone)]
pub enum Write {
    /// Insert a new loan; fails with `Conflict` when the id exists
    InsertLoan(Loan),
    /// Replace a loan iff its stored version still matches
    PutLoan { expected_version: u64, loan: Loan },
    /// Replace an equipment unit iff its stored version still matches
    PutEquipment {
        expected_version: u64,
        equipment: EquipmentUnit,
    },
    InsertNotification(Notification),
}

/// Atomic write batch: commits entirely or not at all
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub writes: Vec<Write>,
}

impl Transaction {
    pub fn insert_loan(&mut self, loan: Loan) -> &mut Self {
        self.writes.push(Write::InsertLoan(loan));
        self
    }

    pub fn put_loan(&mut self, expected_version: u64, loan: Loan) -> &mut Self {
        self.writes.push(Write::PutLoan {
            expected_version,
            loan,
        });
        self
    }

    pub fn put_equipment(&mut self, expected_version: u64, equipment: EquipmentUnit) -> &mut Self {
        self.writes.push(Write::PutEquipment {
            expected_version,
            equipment,
        });
        self
    }

    pub fn notify(&mut self, notifications: Vec<Notification>) -> &mut Self {
        self.writes
            .extend(notifications.into_iter().map(Write::InsertNotification));
        self
    }
}

/// Persistence contract required by the core
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;
    async fn get_equipment(&self, id: Uuid) -> AppResult<Versioned<EquipmentUnit>>;
    async fn get_loan(&self, id: Uuid) -> AppResult<Versioned<Loan>>;

    /// Seeding entry points for the out-of-scope inventory and user
    /// management actions
    async fn insert_user(&self, user: User) -> AppResult<()>;
    async fn insert_equipment(&self, equipment: EquipmentUnit) -> AppResult<()>;

    async fn users(&self) -> AppResult<Vec<User>>;
    async fn equipment(&self) -> AppResult<Vec<EquipmentUnit>>;
    async fn loans(&self) -> AppResult<Vec<Loan>>;
    /// Notifications for a recipient, newest first
    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;

    /// Apply a write batch atomically. Any failed version guard fails
    /// the whole batch with `Conflict` and leaves every entity unchanged.
    async fn commit(&self, tx: Transaction) -> AppResult<()>;

    async fn mark_notification_read(&self, id: Uuid) -> AppResult<()>;
}
