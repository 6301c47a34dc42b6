//! HTTP API handlers

pub mod v1;
