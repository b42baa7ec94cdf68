//! Transport-independent orchestration of reservation and table operations.
//!
//! Each manager owns the store handles it needs, injected at construction, and
//! exposes one method per operation. The gRPC layer only translates messages
//! and delegates here.
//!
//! ## Structure
//!
//! - [`ReservationManager`] - availability check, create (with compensation),
//!   queries, update, delete.
//! - [`TableManager`] - create, list, update, per-date availability.

mod reservations;
mod tables;

pub use reservations::ReservationManager;
pub use tables::TableManager;
