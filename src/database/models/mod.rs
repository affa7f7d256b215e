pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, CompanyFilter, NewCompany};
pub use job::{Job, JobFilter, NewJob};
pub use user::{PgUserStore, User, UserLookup};

use serde_json::Value;

use crate::database::partial_update::UpdatePayload;
use crate::error::ApiError;

/// Shape a field must have to be accepted in a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    NonNegativeInteger,
    /// Number in `0..=1`
    Fraction,
    /// Absolute URL string
    Url,
}

/// A column a client may change through a partial update
#[derive(Debug, Clone, Copy)]
pub struct UpdatableField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl UpdatableField {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, nullable: false }
    }

    pub const fn nullable(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, nullable: true }
    }

    fn check(&self, value: &Value) -> Result<(), ApiError> {
        if value.is_null() {
            return if self.nullable {
                Ok(())
            } else {
                Err(ApiError::bad_request(format!("{} cannot be null", self.name)))
            };
        }

        let ok = match self.kind {
            FieldKind::Text => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            FieldKind::NonNegativeInteger => value
                .as_i64()
                .is_some_and(|n| (0..=i64::from(i32::MAX)).contains(&n)),
            FieldKind::Fraction => value.as_f64().is_some_and(|n| (0.0..=1.0).contains(&n)),
            FieldKind::Url => value.as_str().is_some_and(is_absolute_url),
        };

        if ok {
            Ok(())
        } else {
            Err(ApiError::bad_request(format!(
                "{} must be {}",
                self.name,
                self.kind.describe()
            )))
        }
    }
}

impl FieldKind {
    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "a non-empty string",
            FieldKind::NonNegativeInteger => "a non-negative integer",
            FieldKind::Fraction => "a number between 0 and 1",
            FieldKind::Url => "an absolute URL",
        }
    }
}

/// Reject payload fields that are unknown or have the wrong shape.
///
/// Column names reach SQL text through the SET-clause builder, so every field
/// must be one of `allowed`.
pub fn check_payload(payload: &UpdatePayload, allowed: &[UpdatableField]) -> Result<(), ApiError> {
    for (field, value) in payload.iter() {
        let updatable = allowed
            .iter()
            .find(|f| f.name == field)
            .ok_or_else(|| ApiError::bad_request(format!("Field not allowed: {}", field)))?;
        updatable.check(value)?;
    }
    Ok(())
}

/// Width of the `VARCHAR` handle columns
pub const HANDLE_MAX_LEN: usize = 25;

/// A company handle as stored: non-blank, lowercase, at most [`HANDLE_MAX_LEN`] characters
pub(crate) fn check_handle(field: &str, handle: &str) -> Result<(), ApiError> {
    if handle.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    }
    if handle.chars().count() > HANDLE_MAX_LEN {
        return Err(ApiError::bad_request(format!(
            "{} must be at most {} characters",
            field, HANDLE_MAX_LEN
        )));
    }
    if handle != handle.to_lowercase() {
        return Err(ApiError::bad_request(format!("{} must be lowercase", field)));
    }
    Ok(())
}

pub(crate) fn is_absolute_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok_and(|u| !u.cannot_be_a_base())
}
