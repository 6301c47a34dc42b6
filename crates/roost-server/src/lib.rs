//! Roost Server - HTTP surface of the listing and booking marketplace
//!
//! - `api` - actix-web handlers and routing
//! - `service` - business rules (bookings, listings, reviews, uploads)
//! - `middleware` - authentication and request metrics
//! - `startup` - logging, server construction and graceful shutdown

pub mod api;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod model;
pub mod secured;
pub mod service;
pub mod startup;

pub use error::AppError;
