//! Business logic services

pub mod contacts;

use std::sync::Arc;

use crate::repository::ContactStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub contacts: contacts::ContactsService,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self {
            contacts: contacts::ContactsService::new(store),
        }
    }
}
