//! Storage layer for folio
//!
//! This crate provides:
//! - The SQLite-backed configuration store (current configuration + versions)
//! - Per-owner serialization of writes

pub mod db;
pub mod error;
pub mod models;

pub use db::{DEFAULT_PUBLIC_BASE_URL, Storage};
pub use error::{Result, StorageError};
pub use models::CurrentConfiguration;
