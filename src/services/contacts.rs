//! Contacts service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::contact::{Contact, ContactId, ContactPatch, InsertAck, NewContact},
    repository::ContactStore,
};

#[derive(Clone)]
pub struct ContactsService {
    store: Arc<dyn ContactStore>,
}

impl ContactsService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Check that the store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await.map_err(|e| {
            tracing::error!("Database ping failed: {:?}", e);
            AppError::ServiceUnavailable("Database unreachable".to_string())
        })
    }

    pub async fn list(&self) -> AppResult<Vec<Contact>> {
        self.store
            .find_all()
            .await
            .map_err(|e| AppError::storage("fetching contacts", e))
    }

    pub async fn get_by_id(&self, id: &ContactId) -> AppResult<Contact> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| AppError::storage("fetching contact", e))?
            .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))
    }

    pub async fn create(&self, contact: &NewContact) -> AppResult<InsertAck> {
        let ack = self
            .store
            .insert(contact)
            .await
            .map_err(|e| AppError::storage("creating contact", e))?;

        if !ack.acknowledged {
            return Err(AppError::Internal("Error creating contact.".to_string()));
        }

        tracing::info!("Created contact {}", ack.inserted_id);
        Ok(ack)
    }

    /// Merge `patch` into the contact.
    ///
    /// Not found only when no document matches `id`; a matched document that
    /// ends up unchanged (identical values or empty patch) is a successful no-op.
    pub async fn update(&self, id: &ContactId, patch: &ContactPatch) -> AppResult<()> {
        if patch.is_empty() {
            // `$set` rejects an empty document
            self.get_by_id(id).await?;
            tracing::debug!("Empty update for contact {}", id);
            return Ok(());
        }

        let outcome = self
            .store
            .update(id, patch)
            .await
            .map_err(|e| AppError::storage("updating contact", e))?;

        if outcome.matched == 0 {
            return Err(AppError::NotFound("Contact not found.".to_string()));
        }
        if outcome.modified == 0 {
            tracing::debug!("Update of contact {} changed nothing", id);
        }
        Ok(())
    }

    pub async fn delete(&self, id: &ContactId) -> AppResult<()> {
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| AppError::storage("deleting contact", e))?;

        if deleted == 0 {
            return Err(AppError::NotFound("Contact not found.".to_string()));
        }
        tracing::info!("Deleted contact {}", id);
        Ok(())
    }
}
