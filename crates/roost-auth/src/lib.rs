//! Roost Auth - Authentication
//!
//! This crate provides:
//! - JWT token handling with a verification cache
//! - Password hashing
//! - Account registration and credential checks

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
