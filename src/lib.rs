//! Equiloan equipment loan management core
//!
//! The loan lifecycle state machine and equipment-availability ledger
//! behind an institution's equipment-loan application: students request
//! loans, teachers and admins approve them, borrowers request returns,
//! staff processes them. Every status transition commits together with
//! its equipment-availability adjustment and notification records, or
//! not at all.
//!
//! The crate is a library: presentation, authentication and the real
//! persistence backend are external. Callers pass an authenticated
//! [`models::Actor`] into every operation and provide a [`store::Store`]
//! implementation; [`store::MemoryStore`] is the reference adapter.

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{AppError, AppResult};
