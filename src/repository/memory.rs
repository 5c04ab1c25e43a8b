//! In-process contact store, used by tests and the `memory` backend

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::{ContactStore, StoreResult};
use crate::models::contact::{Contact, ContactId, ContactPatch, InsertAck, NewContact, UpdateOutcome};

#[derive(Default)]
pub struct InMemoryContactStore {
    contacts: RwLock<IndexMap<ContactId, Contact>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_all(&self) -> StoreResult<Vec<Contact>> {
        Ok(self.contacts.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &ContactId) -> StoreResult<Option<Contact>> {
        Ok(self.contacts.read().await.get(id).cloned())
    }

    async fn insert(&self, contact: &NewContact) -> StoreResult<InsertAck> {
        let id = ContactId::new();
        self.contacts
            .write()
            .await
            .insert(id, contact.clone().with_id(id));
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> StoreResult<UpdateOutcome> {
        let mut contacts = self.contacts.write().await;
        let Some(contact) = contacts.get_mut(id) else {
            return Ok(UpdateOutcome::default());
        };
        let modified = patch.apply(contact);
        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn delete(&self, id: &ContactId) -> StoreResult<u64> {
        let removed = self.contacts.write().await.shift_remove(id);
        Ok(u64::from(removed.is_some()))
    }
}
