//! Entity snapshot serialization.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::Entity;

/// An entity could not be serialized into a snapshot.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to serialize {entity_type}: {source}")]
    Json {
        entity_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {entity_type}: {message}")]
    Custom { entity_type: String, message: String },
}

/// Produces the snapshot stored with a pending operation.
pub trait SnapshotSerializer: Send + Sync {
    /// Serialize the entity's current field state.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializeError`] if the entity cannot be represented.
    fn serialize(&self, entity: &dyn Entity) -> Result<String, SerializeError>;
}

/// Serializes an entity's declared fields as a JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotSerializer {
    pretty: bool,
}

impl JsonSnapshotSerializer {
    /// Compact JSON output.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented JSON output.
    #[must_use]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl SnapshotSerializer for JsonSnapshotSerializer {
    fn serialize(&self, entity: &dyn Entity) -> Result<String, SerializeError> {
        let json_error = |source: serde_json::Error| SerializeError::Json {
            entity_type: entity.entity_type().to_string(),
            source,
        };

        let mut object = Map::new();
        for field in entity.fields() {
            let value = serde_json::to_value(&field.value).map_err(json_error)?;
            object.insert(field.name.to_string(), value);
        }

        let value = Value::Object(object);
        if self.pretty {
            serde_json::to_string_pretty(&value).map_err(json_error)
        } else {
            serde_json::to_string(&value).map_err(json_error)
        }
    }
}
