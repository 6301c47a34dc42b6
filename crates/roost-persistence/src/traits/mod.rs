//! Persistence traits for the unified storage abstraction layer
//!
//! This module defines the core persistence traits that abstract over the
//! storage backends: an external database (MySQL/PostgreSQL) and the
//! process-local memory store.

pub mod booking;
pub mod business;
pub mod product;
pub mod review;
pub mod user;

pub use booking::BookingPersistence;
pub use business::BusinessPersistence;
pub use product::ProductPersistence;
pub use review::ReviewPersistence;
pub use user::UserPersistence;

use async_trait::async_trait;

use crate::model::StorageMode;

/// Unified persistence service trait
///
/// This is the main interface for all storage operations. Implementations
/// dispatch to the appropriate storage backend based on the configured mode.
#[async_trait]
pub trait PersistenceService:
    UserPersistence
    + BusinessPersistence
    + ProductPersistence
    + BookingPersistence
    + ReviewPersistence
    + Send
    + Sync
{
    /// Get the current storage mode
    fn storage_mode(&self) -> StorageMode;

    /// Health check for the storage backend
    async fn health_check(&self) -> anyhow::Result<()>;
}
