//! Data models and types

pub mod app_state;
pub mod config;
pub mod request;
pub mod response;

pub use app_state::AppState;
pub use config::Configuration;
pub use response::ErrorResult;
