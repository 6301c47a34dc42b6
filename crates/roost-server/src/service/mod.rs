//! Business rules behind the HTTP handlers
//!
//! Services take the caller's [`AuthContext`](roost_auth::AuthContext) where
//! access depends on it and return `anyhow::Result` carrying `RoostError`.

pub mod booking;
pub mod product;
pub mod review;
pub mod upload;
pub mod user;

/// Today's calendar date in UTC
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
