//! Entity identity resolution.
//!
//! An identity is the canonical string form of an entity's key field. The key
//! field is the single field carrying the explicit key designation, or failing
//! that the single field named `Id` (compared case-insensitively).

use std::fmt;

use thiserror::Error;

use super::traits::{Entity, Field, FieldValue};

/// Errors raised while deriving an entity identity.
///
/// All variants indicate a misconfigured entity type or instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("entity type '{entity_type}' declares more than one key field")]
    MultipleKeys { entity_type: String },

    #[error("entity type '{entity_type}' has more than one field named 'Id' (case-insensitive)")]
    AmbiguousConventionalId { entity_type: String },

    #[error("entity type '{entity_type}' has no key field and no field named 'Id'")]
    NoIdentity { entity_type: String },

    #[error("key field '{field}' of entity type '{entity_type}' is a {found}, expected a string or uuid")]
    UnsupportedIdType {
        entity_type: String,
        field: &'static str,
        found: &'static str,
    },

    #[error("entity of type '{entity_type}' has an empty identity")]
    EmptyIdentity { entity_type: String },
}

/// Canonical identity of an entity within its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identity, returning the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Check if the identity is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the identity of an entity, rejecting blank identities.
///
/// # Errors
///
/// Returns an [`IdentityError`] if the key field cannot be located, has an
/// unsupported type, or holds an empty value.
pub fn resolve(entity: &dyn Entity) -> Result<Identity, IdentityError> {
    let identity = locate(entity)?;
    if identity.is_blank() {
        return Err(IdentityError::EmptyIdentity {
            entity_type: entity.entity_type().to_string(),
        });
    }
    Ok(identity)
}

/// Locate the key field and render its value, without requiring it to be
/// non-empty.
///
/// Classification uses this to validate the shape of a type up front; the
/// emptiness check is deferred until the identity is actually needed.
///
/// # Errors
///
/// Returns an [`IdentityError`] if the key field cannot be located or has an
/// unsupported type.
pub fn locate(entity: &dyn Entity) -> Result<Identity, IdentityError> {
    let entity_type = entity.entity_type();
    let fields = entity.fields();
    let field = key_field(entity_type, &fields)?;

    match &field.value {
        FieldValue::String(s) => Ok(Identity(s.clone())),
        FieldValue::Uuid(u) => Ok(Identity(u.hyphenated().to_string())),
        // A missing string key; blank identities are reported by `resolve`.
        FieldValue::Null => Ok(Identity(String::new())),
        other => Err(IdentityError::UnsupportedIdType {
            entity_type: entity_type.to_string(),
            field: field.name,
            found: other.type_name(),
        }),
    }
}

fn key_field<'f>(entity_type: &str, fields: &'f [Field]) -> Result<&'f Field, IdentityError> {
    let mut keys = fields.iter().filter(|f| f.is_key);
    if let Some(key) = keys.next() {
        if keys.next().is_some() {
            return Err(IdentityError::MultipleKeys {
                entity_type: entity_type.to_string(),
            });
        }
        return Ok(key);
    }

    let mut ids = fields.iter().filter(|f| f.name.eq_ignore_ascii_case("id"));
    match (ids.next(), ids.next()) {
        (Some(id), None) => Ok(id),
        (Some(_), Some(_)) => Err(IdentityError::AmbiguousConventionalId {
            entity_type: entity_type.to_string(),
        }),
        (None, _) => Err(IdentityError::NoIdentity {
            entity_type: entity_type.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const GUID: &str = "564dce31-0f3c-43af-80dc-ae751590e57f";

    struct Shape(Vec<Field>);

    impl Entity for Shape {
        fn entity_type(&self) -> &'static str {
            "shape"
        }

        fn fields(&self) -> Vec<Field> {
            self.0.clone()
        }
    }

    fn guid() -> Uuid {
        Uuid::parse_str(GUID).unwrap()
    }

    #[test]
    fn test_explicit_string_key() {
        let e = Shape(vec![Field::key("MyId", "pickme"), Field::new("Name", "x")]);
        assert_eq!(resolve(&e).unwrap().as_str(), "pickme");
    }

    #[test]
    fn test_explicit_uuid_key() {
        let e = Shape(vec![Field::key("MyId", guid())]);
        assert_eq!(resolve(&e).unwrap().as_str(), GUID);
    }

    #[test]
    fn test_conventional_string_id() {
        let e = Shape(vec![Field::new("Id", "pickme")]);
        assert_eq!(resolve(&e).unwrap().as_str(), "pickme");
    }

    #[test]
    fn test_conventional_uuid_id_is_lowercase() {
        let upper = Uuid::parse_str(&GUID.to_uppercase()).unwrap();
        let e = Shape(vec![Field::new("id", upper)]);
        assert_eq!(resolve(&e).unwrap().as_str(), GUID);
    }

    #[test]
    fn test_explicit_key_beats_convention() {
        let e = Shape(vec![
            Field::new("Id", "don't pick me"),
            Field::key("MyId", guid()),
        ]);
        assert_eq!(resolve(&e).unwrap().as_str(), GUID);
    }

    #[test]
    fn test_explicit_key_on_id_field_with_other_id() {
        let e = Shape(vec![Field::key("Id", "pickme"), Field::new("ID", 5_i64)]);
        assert_eq!(resolve(&e).unwrap().as_str(), "pickme");
    }

    #[test]
    fn test_multiple_keys() {
        let e = Shape(vec![Field::key("Id", "a"), Field::key("Other", "b")]);
        assert!(matches!(resolve(&e), Err(IdentityError::MultipleKeys { .. })));
    }

    #[test]
    fn test_ambiguous_conventional_id_any_order() {
        let a = Shape(vec![Field::new("Id", "a"), Field::new("ID", "b")]);
        let b = Shape(vec![Field::new("ID", "b"), Field::new("Id", "a")]);
        let c = Shape(vec![Field::new("id", "a"), Field::new("Name", "n"), Field::new("iD", "b")]);
        for e in [a, b, c] {
            assert!(matches!(
                resolve(&e),
                Err(IdentityError::AmbiguousConventionalId { .. })
            ));
        }
    }

    #[test]
    fn test_no_identity() {
        let e = Shape(vec![Field::new("MyId", "a")]);
        assert!(matches!(resolve(&e), Err(IdentityError::NoIdentity { .. })));
    }

    #[test]
    fn test_unsupported_conventional_type() {
        let e = Shape(vec![Field::new("Id", 42_i64)]);
        let err = resolve(&e).unwrap_err();
        assert_eq!(
            err,
            IdentityError::UnsupportedIdType {
                entity_type: "shape".to_string(),
                field: "Id",
                found: "integer",
            }
        );
    }

    #[test]
    fn test_unsupported_key_type() {
        let e = Shape(vec![Field::key("MyId", 42_i64)]);
        assert!(matches!(
            resolve(&e),
            Err(IdentityError::UnsupportedIdType { .. })
        ));
    }

    #[test]
    fn test_empty_identity_only_on_resolve() {
        for value in [FieldValue::from(""), FieldValue::from("   "), FieldValue::Null] {
            let e = Shape(vec![Field::new("Id", value)]);
            assert!(locate(&e).is_ok());
            assert!(matches!(resolve(&e), Err(IdentityError::EmptyIdentity { .. })));
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let e = Shape(vec![Field::key("Code", "abc"), Field::new("Name", "n")]);
        let first = resolve(&e).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&e).unwrap(), first);
        }
    }
}
