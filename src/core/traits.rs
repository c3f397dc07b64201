//! Type metadata for entities that flow through the offline queue.
//!
//! The queue never inspects host types directly. Instead every entity type
//! implements [`Entity`], describing its stable type name, whether it is
//! mirrored to a remote table, and the fields it declares.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A value held by a declared entity field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// UTF-8 string value.
    String(String),
    /// 128-bit UUID value.
    Uuid(Uuid),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Timestamp value.
    Timestamp(DateTime<Utc>),
    /// List of strings (e.g., tags).
    StringList(Vec<String>),
    /// Absent value.
    Null,
}

impl FieldValue {
    /// Short name of the value's type, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Uuid(_) => "uuid",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Timestamp(_) => "timestamp",
            Self::StringList(_) => "string list",
            Self::Null => "null",
        }
    }

    /// Check if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A declared field of an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Declared field name.
    pub name: &'static str,
    /// Whether the field carries the explicit key designation.
    pub is_key: bool,
    /// Current value.
    pub value: FieldValue,
}

impl Field {
    /// A plain field.
    pub fn new(name: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            name,
            is_key: false,
            value: value.into(),
        }
    }

    /// A field explicitly designated as the entity key.
    pub fn key(name: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            name,
            is_key: true,
            value: value.into(),
        }
    }
}

/// Marks an entity type as mirrored by a remote table.
///
/// The optional path is consumed by synchronization providers; the queue only
/// cares whether the designation is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteTable {
    path: Option<&'static str>,
}

impl RemoteTable {
    /// Remote table whose path is derived from the entity type at runtime.
    #[must_use]
    pub const fn default_path() -> Self {
        Self { path: None }
    }

    /// Remote table at a fixed path.
    #[must_use]
    pub const fn at(path: &'static str) -> Self {
        Self { path: Some(path) }
    }

    /// The fixed path, if one was declared.
    #[must_use]
    pub const fn path(&self) -> Option<&'static str> {
        self.path
    }
}

/// Static metadata for a type whose mutations may be queued.
///
/// `entity_type` and `remote_table` describe the type and must return the same
/// answer for every instance. `fields` lists the instance's declared fields in
/// declaration order.
pub trait Entity {
    /// Stable type identifier, persisted with every queued operation.
    fn entity_type(&self) -> &'static str;

    /// Remote table designation, or `None` for local-only types.
    fn remote_table(&self) -> Option<RemoteTable> {
        None
    }

    /// Declared fields and their current values.
    fn fields(&self) -> Vec<Field>;
}
