//! Core abstractions for offline-queue.
//!
//! This module provides the entity metadata traits, identity resolution and
//! remote-entity classification shared by the queue features.

pub mod classifier;
pub mod identity;
mod traits;

pub use classifier::EntityClassifier;
pub use identity::{Identity, IdentityError};
pub use traits::{Entity, Field, FieldValue, RemoteTable};
