//! In-memory reference adapter for the persistence contract
//!
//! Writers serialize on a single mutex, which is what gives `commit`
//! its all-or-nothing guarantee here. Real adapters are expected to
//! use their backend's transactional batch instead.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{EquipmentUnit, Loan, Notification, User},
};

use super::{Store, Transaction, Versioned, Write};

/// Change notification for live-view adapters. Carries only the entity
/// id; subscribers re-query, they do not receive state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Loan(Uuid),
    Equipment(Uuid),
    Notification(Uuid),
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    equipment: HashMap<Uuid, Versioned<EquipmentUnit>>,
    loans: HashMap<Uuid, Versioned<Loan>>,
    notifications: HashMap<Uuid, Notification>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    events: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            tables: Mutex::new(Tables::default()),
            events,
        }
    }

    /// Optional live-update hook: a stream of change events emitted
    /// after each successful write. Not required for correctness.
    pub fn subscribe(&self) -> BroadcastStream<ChangeEvent> {
        BroadcastStream::new(self.events.subscribe())
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned mutex means a panic mid-read; the tables themselves
        // are only mutated after full validation, so the data is intact.
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: ChangeEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.lock()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn get_equipment(&self, id: Uuid) -> AppResult<Versioned<EquipmentUnit>> {
        self.lock()
            .equipment
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn get_loan(&self, id: Uuid) -> AppResult<Versioned<Loan>> {
        self.lock()
            .loans
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    async fn insert_user(&self, user: User) -> AppResult<()> {
        let mut tables = self.lock();
        if tables.users.contains_key(&user.id) {
            return Err(AppError::Conflict(format!("User {} already exists", user.id)));
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    async fn insert_equipment(&self, equipment: EquipmentUnit) -> AppResult<()> {
        let mut tables = self.lock();
        if tables.equipment.contains_key(&equipment.id) {
            return Err(AppError::Conflict(format!(
                "Equipment {} already exists",
                equipment.id
            )));
        }
        let id = equipment.id;
        tables.equipment.insert(
            id,
            Versioned {
                value: equipment,
                version: 1,
            },
        );
        drop(tables);
        self.emit(ChangeEvent::Equipment(id));
        Ok(())
    }

    async fn users(&self) -> AppResult<Vec<User>> {
        Ok(self.lock().users.values().cloned().collect())
    }

    async fn equipment(&self) -> AppResult<Vec<EquipmentUnit>> {
        Ok(self
            .lock()
            .equipment
            .values()
            .map(|v| v.value.clone())
            .collect())
    }

    async fn loans(&self) -> AppResult<Vec<Loan>> {
        Ok(self.lock().loans.values().map(|v| v.value.clone()).collect())
    }

    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .lock()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn commit(&self, tx: Transaction) -> AppResult<()> {
        let mut tables = self.lock();

        // Validate every guard before touching anything
        for write in &tx.writes {
            match write {
                Write::InsertLoan(loan) => {
                    if tables.loans.contains_key(&loan.id) {
                        return Err(AppError::Conflict(format!(
                            "Loan {} already exists",
                            loan.id
                        )));
                    }
                }
                Write::PutLoan {
                    expected_version,
                    loan,
                } => {
                    let current = tables.loans.get(&loan.id).ok_or_else(|| {
                        AppError::NotFound(format!("Loan {} not found", loan.id))
                    })?;
                    if current.version != *expected_version {
                        return Err(AppError::Conflict(format!(
                            "Loan {} was modified concurrently",
                            loan.id
                        )));
                    }
                }
                Write::PutEquipment {
                    expected_version,
                    equipment,
                } => {
                    let current = tables.equipment.get(&equipment.id).ok_or_else(|| {
                        AppError::NotFound(format!("Equipment {} not found", equipment.id))
                    })?;
                    if current.version != *expected_version {
                        return Err(AppError::Conflict(format!(
                            "Equipment {} was modified concurrently",
                            equipment.id
                        )));
                    }
                }
                Write::InsertNotification(_) => {}
            }
        }

        // Apply
        let mut events = Vec::with_capacity(tx.writes.len());
        for write in tx.writes {
            match write {
                Write::InsertLoan(loan) => {
                    let id = loan.id;
                    tables.loans.insert(
                        id,
                        Versioned {
                            value: loan,
                            version: 1,
                        },
                    );
                    events.push(ChangeEvent::Loan(id));
                }
                Write::PutLoan {
                    expected_version,
                    loan,
                } => {
                    let id = loan.id;
                    tables.loans.insert(
                        id,
                        Versioned {
                            value: loan,
                            version: expected_version + 1,
                        },
                    );
                    events.push(ChangeEvent::Loan(id));
                }
                Write::PutEquipment {
                    expected_version,
                    equipment,
                } => {
                    let id = equipment.id;
                    tables.equipment.insert(
                        id,
                        Versioned {
                            value: equipment,
                            version: expected_version + 1,
                        },
                    );
                    events.push(ChangeEvent::Equipment(id));
                }
                Write::InsertNotification(notification) => {
                    let id = notification.id;
                    tables.notifications.insert(id, notification);
                    events.push(ChangeEvent::Notification(id));
                }
            }
        }

        drop(tables);
        for event in events {
            self.emit(event);
        }
        Ok(())
    }

    async fn mark_notification_read(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.lock();
        let notification = tables
            .notifications
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;
        notification.is_read = true;
        drop(tables);
        self.emit(ChangeEvent::Notification(id));
        Ok(())
    }
}
