//! Storage layer for offline-queue.
//!
//! `SQLite` persistence for the operations queue and synchronization
//! bookmarks.

mod database;
mod migrations;

pub use database::Database;
