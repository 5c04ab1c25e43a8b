//! MongoDB-backed contact store

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    Collection, Database,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use super::{ContactStore, StoreError, StoreResult};
use crate::models::contact::{Contact, ContactId, ContactPatch, InsertAck, NewContact, UpdateOutcome};

/// Stored shape of a contact document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    favorite_color: Option<String>,
    #[serde(default, deserialize_with = "text_or_date")]
    birthday: Option<String>,
}

/// Birthdays written by other clients may be BSON dates; those read back as
/// RFC 3339 text.
fn text_or_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Bson>::deserialize(deserializer)? {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::String(text)) => Ok(Some(text)),
        Some(Bson::DateTime(date)) => date.try_to_rfc3339_string().map(Some).map_err(de::Error::custom),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or date for birthday, found {:?}",
            other.element_type()
        ))),
    }
}

impl ContactDocument {
    fn into_contact(self) -> Contact {
        Contact {
            id: self.id.into(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            favorite_color: self.favorite_color,
            birthday: self.birthday,
        }
    }
}

#[derive(Clone)]
pub struct MongoContactStore {
    database: Database,
    collection: Collection<ContactDocument>,
}

impl MongoContactStore {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(collection),
        }
    }
}

/// `$set` body of a patch
fn set_document(patch: &ContactPatch) -> Document {
    let mut set = Document::new();
    for (name, value) in patch.fields() {
        set.insert(name, value);
    }
    set
}

#[async_trait]
impl ContactStore for MongoContactStore {
    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn find_all(&self) -> StoreResult<Vec<Contact>> {
        let docs: Vec<ContactDocument> = self.collection.find(None, None).await?.try_collect().await?;
        Ok(docs.into_iter().map(ContactDocument::into_contact).collect())
    }

    async fn find_by_id(&self, id: &ContactId) -> StoreResult<Option<Contact>> {
        let found = self
            .collection
            .find_one(doc! { "_id": id.object_id() }, None)
            .await?;
        Ok(found.map(ContactDocument::into_contact))
    }

    async fn insert(&self, contact: &NewContact) -> StoreResult<InsertAck> {
        let result = self
            .collection
            .clone_with_type::<NewContact>()
            .insert_one(contact, None)
            .await?;

        let inserted_id = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::Backend(format!("unexpected inserted id {}", result.inserted_id))
        })?;

        // The driver only returns once the server acknowledged the write
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        })
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> StoreResult<UpdateOutcome> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id.object_id() },
                doc! { "$set": set_document(patch) },
                None,
            )
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete(&self, id: &ContactId) -> StoreResult<u64> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.object_id() }, None)
            .await?;
        Ok(result.deleted_count)
    }
}
