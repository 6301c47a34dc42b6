//! Roost Persistence - Database entities and storage backends
//!
//! This crate provides:
//! - SeaORM entity definitions for users, businesses, listings, bookings and reviews
//! - The `PersistenceService` trait family shared by all backends
//! - `ExternalDbPersistService` for MySQL/PostgreSQL
//! - `MemoryPersistService` for single-node development and tests

pub mod entity;
pub mod memory;
pub mod model;
pub mod sql;
pub mod traits;

// Re-export sea_orm for downstream crates
pub use sea_orm;

pub use memory::MemoryPersistService;
pub use model::*;
pub use sql::ExternalDbPersistService;
pub use traits::*;
