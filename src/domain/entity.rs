//! Descriptor-driven persistence model.
//!
//! Every persisted record type implements [`Entity`] and declares an explicit
//! [`EntityDescriptor`]: the table it lives in, its primary-key column, the
//! column used for stable ordering, and the full column list with value kinds
//! and mutability. The generic store builds all of its SQL from these
//! descriptors, so no entity is ever special-cased by name.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, sqlite::SqliteRow, FromRow};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Bool,
    Timestamp,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub editable: bool,
}

impl Column {
    pub const fn fixed(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind, editable: false }
    }

    pub const fn editable(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind, editable: true }
    }
}

#[derive(Debug)]
pub struct EntityDescriptor {
    /// Human name used in error messages ("Project not found").
    pub label: &'static str,
    pub table: &'static str,
    pub key: &'static str,
    pub order_by: &'static str,
    pub columns: &'static [Column],
}

impl EntityDescriptor {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", self.label))
    }
}

/// A single bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Value),
}

impl FieldValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            FieldValue::Text(_) => ColumnKind::Text,
            FieldValue::Integer(_) => ColumnKind::Integer,
            FieldValue::Bool(_) => ColumnKind::Bool,
            FieldValue::Timestamp(_) => ColumnKind::Timestamp,
            FieldValue::Json(_) => ColumnKind::Json,
        }
    }

    /// Converts a JSON request value into a value of the given column kind.
    pub fn from_json(kind: ColumnKind, value: Value) -> Result<Self, String> {
        match (kind, value) {
            (ColumnKind::Json, v) => Ok(FieldValue::Json(v)),
            (ColumnKind::Text, Value::Null) => Ok(FieldValue::Text(None)),
            (ColumnKind::Integer, Value::Null) => Ok(FieldValue::Integer(None)),
            (ColumnKind::Bool, Value::Null) => Ok(FieldValue::Bool(None)),
            (ColumnKind::Timestamp, Value::Null) => Ok(FieldValue::Timestamp(None)),
            (ColumnKind::Text, Value::String(s)) => Ok(FieldValue::Text(Some(s))),
            (ColumnKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(|n| FieldValue::Integer(Some(n)))
                .ok_or_else(|| "expected an integer".to_string()),
            (ColumnKind::Bool, Value::Bool(b)) => Ok(FieldValue::Bool(Some(b))),
            (ColumnKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(&s)
                .map(|ts| FieldValue::Timestamp(Some(ts.with_timezone(&Utc))))
                .map_err(|_| "expected an RFC 3339 timestamp".to_string()),
            (ColumnKind::Text, _) => Err("expected a string".to_string()),
            (ColumnKind::Integer, _) => Err("expected an integer".to_string()),
            (ColumnKind::Bool, _) => Err("expected a boolean".to_string()),
            (ColumnKind::Timestamp, _) => Err("expected an RFC 3339 timestamp".to_string()),
        }
    }

    /// Converts a raw query-string value into a value of the given column kind.
    pub fn from_query(kind: ColumnKind, raw: &str) -> Result<Self, String> {
        match kind {
            ColumnKind::Text => Ok(FieldValue::Text(Some(raw.to_string()))),
            ColumnKind::Integer => raw
                .parse::<i64>()
                .map(|n| FieldValue::Integer(Some(n)))
                .map_err(|_| "expected an integer".to_string()),
            ColumnKind::Bool => match raw {
                "true" | "1" => Ok(FieldValue::Bool(Some(true))),
                "false" | "0" => Ok(FieldValue::Bool(Some(false))),
                _ => Err("expected true or false".to_string()),
            },
            ColumnKind::Timestamp | ColumnKind::Json => Err("column cannot be filtered".to_string()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(Some(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(Some(value.to_string()))
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(Some(value.clone()))
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(Some(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(Some(value))
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(Some(value))
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

/// Conjunction of equality conditions.
#[derive(Debug, Default, Clone)]
pub struct Filter {
    clauses: Vec<(&'static str, FieldValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.clauses.push((column, value.into()));
        self
    }

    pub fn eq_opt<V: Into<FieldValue>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    /// Builds a filter from query-string parameters, ignoring `reserved` keys
    /// (pagination). Unknown columns are rejected.
    pub fn from_query(
        descriptor: &EntityDescriptor,
        params: &HashMap<String, String>,
        reserved: &[&str],
    ) -> Result<Self, AppError> {
        let mut keys: Vec<&String> = params.keys().filter(|k| !reserved.contains(&k.as_str())).collect();
        keys.sort();

        let mut filter = Filter::new();
        for key in keys {
            let column = descriptor
                .column(key)
                .ok_or_else(|| AppError::Validation(format!("Unknown filter '{}'", key)))?;
            let value = FieldValue::from_query(column.kind, &params[key])
                .map_err(|e| AppError::Validation(format!("Invalid filter '{}': {}", key, e)))?;
            filter = filter.eq(column.name, value);
        }
        Ok(filter)
    }

    pub fn clauses(&self) -> &[(&'static str, FieldValue)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Partial update: only the listed columns are written.
#[derive(Debug, Default, Clone)]
pub struct Patch {
    changes: Vec<(&'static str, FieldValue)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.changes.retain(|(c, _)| *c != column);
        self.changes.push((column, value.into()));
        self
    }

    /// Builds a patch from a JSON object, accepting only editable columns.
    pub fn from_json(descriptor: &EntityDescriptor, body: Map<String, Value>) -> Result<Self, AppError> {
        let mut patch = Patch::new();
        for (key, value) in body {
            let column = descriptor
                .column(&key)
                .ok_or_else(|| AppError::Validation(format!("Unknown field '{}'", key)))?;
            if !column.editable {
                return Err(AppError::Validation(format!("Field '{}' cannot be updated", key)));
            }
            let value = FieldValue::from_json(column.kind, value)
                .map_err(|e| AppError::Validation(format!("Invalid value for '{}': {}", key, e)))?;
            patch = patch.set(column.name, value);
        }
        Ok(patch)
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.changes.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn changes(&self) -> &[(&'static str, FieldValue)] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// A record type persisted through the generic store.
///
/// `values()` must yield one value per descriptor column, in descriptor order.
pub trait Entity:
    for<'r> FromRow<'r, SqliteRow> + for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    const DESCRIPTOR: &'static EntityDescriptor;

    fn key(&self) -> &str;

    fn values(&self) -> Vec<FieldValue>;
}
