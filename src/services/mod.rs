//! Business logic services

pub mod ledger;
pub mod loans;
pub mod notifications;
pub mod policy;
pub mod queries;

use std::sync::Arc;

use crate::store::Store;

pub use ledger::EquipmentLedger;
pub use loans::LoanService;
pub use notifications::NotificationsService;
pub use policy::{AccessPolicy, LoanAction};
pub use queries::{QueryService, StatEntry};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub loans: LoanService,
    pub notifications: NotificationsService,
    pub queries: QueryService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            loans: LoanService::new(store.clone()),
            notifications: NotificationsService::new(store.clone()),
            queries: QueryService::new(store),
        }
    }
}
