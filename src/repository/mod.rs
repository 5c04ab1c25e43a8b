//! Repository layer for contact storage

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::contact::{Contact, ContactId, ContactPatch, InsertAck, NewContact, UpdateOutcome};

pub use memory::InMemoryContactStore;
pub use mongo::MongoContactStore;

/// Errors raised by a store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations on the contacts collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Check that the backing database answers
    async fn ping(&self) -> StoreResult<()>;

    async fn find_all(&self) -> StoreResult<Vec<Contact>>;

    async fn find_by_id(&self, id: &ContactId) -> StoreResult<Option<Contact>>;

    async fn insert(&self, contact: &NewContact) -> StoreResult<InsertAck>;

    /// Field-level `$set` of the patch on the matching document
    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> StoreResult<UpdateOutcome>;

    /// Returns the number of deleted documents
    async fn delete(&self, id: &ContactId) -> StoreResult<u64>;
}
