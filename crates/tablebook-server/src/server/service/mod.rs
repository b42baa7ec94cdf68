//! gRPC service implementations and store wiring.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC entry points (`ReservationHandler`, `TableHandler`).
//! - [`Handlers`] - opens the configured store and builds both handlers over it.

pub mod handler;

use crate::server::config::StoreConfig;
use anyhow::Context;
use handler::{ReservationHandler, TableHandler};
use std::sync::Arc;
use tablebook_core::{
    service::{ReservationManager, TableManager},
    store::{MemoryStore, RedbStore, ReservationStore, TableStore},
};

/// Both gRPC handlers, sharing one document store.
#[derive(Clone)]
pub struct Handlers {
    pub reservations: ReservationHandler,
    pub tables: TableHandler,
}

impl Handlers {
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: ReservationStore + TableStore + 'static,
    {
        let reservations = ReservationManager::new(store.clone(), store.clone());
        let tables = TableManager::new(store.clone(), store);
        Self {
            reservations: ReservationHandler::new(reservations),
            tables: TableHandler::new(tables),
        }
    }

    pub fn open(config: &StoreConfig) -> anyhow::Result<Self> {
        match config {
            StoreConfig::Memory => Ok(Self::new(Arc::new(MemoryStore::new()))),
            StoreConfig::Redb { path } => {
                let store = RedbStore::open(path)
                    .with_context(|| format!("failed to open database at {}", path.display()))?;
                Ok(Self::new(Arc::new(store)))
            }
        }
    }
}
