//! SET-clause generation for partial updates.
//!
//! A partial update only touches the fields the caller supplied. The builder
//! turns an ordered list of `(field, value)` pairs into a parameterized
//! `"column"=$N` list plus the values to bind, in the same order.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Logical field name to physical column name. Fields not listed map to themselves.
pub type FieldAliases = [(&'static str, &'static str)];

/// Ordered field/value pairs supplied by a caller for a partial update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct UpdatePayload(Vec<(String, Value)>);

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Order of insertion is the order of the generated placeholders.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(field, _)| field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.iter().find(|(f, _)| *f == field).map(|(_, v)| v)
    }
}

impl From<Map<String, Value>> for UpdatePayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for UpdatePayload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Output of [`sql_for_partial_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    /// One `"column"=$N` fragment per payload field
    pub fragments: Vec<String>,
    /// Bind values, positionally aligned with the `$N` placeholders
    pub values: Vec<Value>,
}

impl SetClause {
    /// Fragments joined into the body of a SQL `SET` clause
    pub fn set_cols(&self) -> String {
        self.fragments.join(", ")
    }

    /// Placeholder for the first parameter after the SET values, e.g. the row key
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }
}

/// Build the SET clause for a partial update.
///
/// Column names are interpolated into SQL text, so `payload` must only carry
/// fields the caller has already checked against its own list of columns.
/// Values are always bound.
///
/// ```text
/// {firstName: "Aliya", age: 32}  =>  "first_name"=$1, "age"=$2
/// ```
pub fn sql_for_partial_update(
    payload: UpdatePayload,
    js_to_sql: &FieldAliases,
) -> Result<SetClause, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::bad_request("No data"));
    }

    let mut fragments = Vec::with_capacity(payload.len());
    let mut values = Vec::with_capacity(payload.len());

    for (idx, (field, value)) in payload.0.into_iter().enumerate() {
        let column = js_to_sql
            .iter()
            .find(|(js, _)| *js == field)
            .map(|(_, sql)| *sql)
            .unwrap_or(field.as_str());
        fragments.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value);
    }

    Ok(SetClause { fragments, values })
}
