//! Contact model

use std::{fmt, str::FromStr};

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

/// Storage-assigned contact identifier (24 hexadecimal characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId(ObjectId);

impl ContactId {
    /// Mint a fresh identifier
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a path parameter; `None` unless it is exactly 24 hex characters
    pub fn parse(raw: &str) -> Option<Self> {
        ObjectId::parse_str(raw).ok().map(Self)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for ContactId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for ContactId {
    type Err = mongodb::bson::oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(Self)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for ContactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContactId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Contact record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id")]
    #[schema(value_type = String, example = "65f1c0a2b4d3e8a1f2c3d4e5")]
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
}

/// Fields of a contact about to be inserted (identity is minted by storage)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
}

impl NewContact {
    pub fn with_id(self, id: ContactId) -> Contact {
        Contact {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            favorite_color: self.favorite_color,
            birthday: self.birthday,
        }
    }
}

/// Create contact request
///
/// Required fields are optional here so that a missing or `null` value is
/// reported as a field error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateContact {
    #[serde(rename = "firstName")]
    #[validate(
        required(message = "First name is required"),
        length(min = 1, message = "First name is required")
    )]
    #[schema(value_type = String)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    #[validate(
        required(message = "Last name is required"),
        length(min = 1, message = "Last name is required")
    )]
    #[schema(value_type = String)]
    pub last_name: Option<String>,
    #[validate(
        required(message = "Valid email is required"),
        custom(function = "email_address")
    )]
    #[schema(value_type = String)]
    pub email: Option<String>,
    #[serde(rename = "favoriteColor")]
    pub favorite_color: Option<String>,
    /// Free-form date, e.g. `1815-12-10`
    pub birthday: Option<String>,
}

impl From<CreateContact> for NewContact {
    fn from(data: CreateContact) -> Self {
        Self {
            first_name: data.first_name.unwrap_or_default(),
            last_name: data.last_name.unwrap_or_default(),
            email: data.email.unwrap_or_default(),
            favorite_color: data.favorite_color.filter(|v| !v.is_empty()),
            birthday: data.birthday.filter(|v| !v.is_empty()),
        }
    }
}

/// Address syntax check that also insists on a top-level domain, so
/// `ada@localhost` is rejected.
fn email_address(value: &str) -> Result<(), ValidationError> {
    if value.validate_email() && has_tld(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("Valid email is required".into());
    Err(err)
}

fn has_tld(address: &str) -> bool {
    let Some((_, domain)) = address.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && tld.chars().count() >= 2
        && (tld.chars().all(char::is_alphabetic) || tld.to_ascii_lowercase().starts_with("xn--"))
}

/// Update contact request; every field optional
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateContact {
    #[serde(rename = "firstName")]
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "email_address"))]
    pub email: Option<String>,
    #[serde(rename = "favoriteColor")]
    pub favorite_color: Option<String>,
    pub birthday: Option<String>,
}

/// Field-level changes to merge into a stored contact.
///
/// A slot is `Some` only when the request carried a non-empty value for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub favorite_color: Option<String>,
    pub birthday: Option<String>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.favorite_color.is_none()
            && self.birthday.is_none()
    }

    /// Present fields as (stored name, value) pairs
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("favoriteColor", &self.favorite_color),
            ("birthday", &self.birthday),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    /// Merge into `contact`, returning whether anything changed
    pub fn apply(&self, contact: &mut Contact) -> bool {
        let mut changed = false;

        macro_rules! merge {
            ($field:ident) => {
                if let Some(ref val) = self.$field {
                    if contact.$field != *val {
                        contact.$field = val.clone();
                        changed = true;
                    }
                }
            };
            (opt $field:ident) => {
                if let Some(ref val) = self.$field {
                    if contact.$field.as_ref() != Some(val) {
                        contact.$field = Some(val.clone());
                        changed = true;
                    }
                }
            };
        }

        merge!(first_name);
        merge!(last_name);
        merge!(email);
        merge!(opt favorite_color);
        merge!(opt birthday);

        changed
    }
}

impl From<UpdateContact> for ContactPatch {
    fn from(data: UpdateContact) -> Self {
        fn truthy(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        Self {
            first_name: truthy(data.first_name),
            last_name: truthy(data.last_name),
            email: truthy(data.email),
            favorite_color: truthy(data.favorite_color),
            birthday: truthy(data.birthday),
        }
    }
}

/// Insert acknowledgment returned by the create endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    #[schema(value_type = String)]
    pub inserted_id: ContactId,
}

/// Matched and modified document counts of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}
