//! Request validation rules.
//!
//! Body constraints are declared on the request types with `validator`
//! attributes; this module runs them together with the identifier rule and
//! collects every failure into a single list.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::contact::ContactId,
};

pub const INVALID_CONTACT_ID: &str = "Invalid contact ID";

/// Where a validated value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Params,
    Body,
}

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(value_type = Object)]
    pub value: Value,
    pub msg: String,
    pub param: String,
    pub location: Location,
}

impl FieldError {
    pub fn new(param: &str, location: Location, value: Value, msg: &str) -> Self {
        Self {
            value,
            msg: msg.to_string(),
            param: param.to_string(),
            location,
        }
    }
}

/// Accumulates failures across the rules of one route
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the `id` path parameter
    pub fn contact_id(&mut self, raw: &str) -> Option<ContactId> {
        let id = ContactId::parse(raw);
        if id.is_none() {
            self.errors.push(FieldError::new(
                "id",
                Location::Params,
                Value::String(raw.to_string()),
                INVALID_CONTACT_ID,
            ));
        }
        id
    }

    /// Run the declared constraints of a request body
    pub fn body<T: Validate>(&mut self, body: &T) {
        let Err(report) = body.validate() else {
            return;
        };

        let mut found: Vec<FieldError> = report
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let param = json_name(&field.to_string());
                errors.iter().map(move |err| FieldError {
                    value: err.params.get("value").cloned().unwrap_or(Value::Null),
                    msg: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", err.code)),
                    param: param.clone(),
                    location: Location::Body,
                })
            })
            .collect();
        // field_errors() is a map; keep the output stable
        found.sort_by(|a, b| a.param.cmp(&b.param));
        self.errors.extend(found);
    }

    /// `Err(AppError::Validation)` carrying every failure, if any
    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Request bodies use camelCase keys
fn json_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Validate a body on its own
pub fn validate_body<T: Validate>(body: &T) -> AppResult<()> {
    let mut violations = Violations::new();
    violations.body(body);
    violations.finish()
}

/// Parse an identifier for routes that report a malformed id as a plain message
pub fn parse_contact_id(raw: &str) -> AppResult<ContactId> {
    ContactId::parse(raw).ok_or_else(|| AppError::BadRequest(INVALID_CONTACT_ID.to_string()))
}
