//! Remote-entity classification with a per-type cache.

use dashmap::DashMap;
use tracing::debug;

use super::identity::{self, IdentityError};
use super::traits::Entity;

/// Decides, once per entity type, whether mutations to it are queued.
///
/// Types are static, so answers are cached for the lifetime of the classifier
/// and never invalidated. Only successful classifications are cached: a type
/// that claims a remote table but cannot yield an identity is re-checked (and
/// fails again) on every call.
#[derive(Debug, Default)]
pub struct EntityClassifier {
    cache: DashMap<&'static str, bool>,
}

impl EntityClassifier {
    /// Create a classifier with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the sample's type is remote-tracked.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] when the type carries a remote table
    /// designation but its key field cannot be located.
    pub fn is_remote_tracked(&self, sample: &dyn Entity) -> Result<bool, IdentityError> {
        let entity_type = sample.entity_type();
        if let Some(tracked) = self.cache.get(entity_type) {
            return Ok(*tracked);
        }

        let tracked = match sample.remote_table() {
            None => false,
            Some(table) => {
                identity::locate(sample)?;
                debug!(entity_type, path = ?table.path(), "classified remote table entity");
                true
            }
        };

        // Concurrent first classifications compute the same answer.
        let cached = *self.cache.entry(entity_type).or_insert(tracked);
        Ok(cached)
    }

    /// The cached answer for a type, if it has been classified.
    #[must_use]
    pub fn cached(&self, entity_type: &str) -> Option<bool> {
        self.cache.get(entity_type).map(|v| *v)
    }

    /// Number of classified types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if no type has been classified yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
