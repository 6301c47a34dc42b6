//! Error taxonomy for Roost
//!
//! Every failure a client can observe is one of the `RoostError` variants.
//! Services raise them inside `anyhow::Error`, and the HTTP layer downcasts
//! to pick the status code and the `error` label of the response body.

/// Application-specific error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoostError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl RoostError {
    pub fn not_found(message: impl Into<String>) -> Self {
        RoostError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        RoostError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        RoostError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        RoostError::Forbidden(message.into())
    }

    /// HTTP status code this error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            RoostError::NotFound(_) => 404,
            RoostError::BadRequest(_) | RoostError::Validation(_) => 400,
            RoostError::Unauthorized(_) => 401,
            RoostError::Forbidden(_) => 403,
            RoostError::DatabaseError(_) | RoostError::InternalError(_) => 500,
        }
    }

    /// Reason phrase used as the `error` field of the response body
    pub fn error_name(&self) -> &'static str {
        match self {
            RoostError::NotFound(_) => "Not Found",
            RoostError::BadRequest(_) | RoostError::Validation(_) => "Bad Request",
            RoostError::Unauthorized(_) => "Unauthorized",
            RoostError::Forbidden(_) => "Forbidden",
            RoostError::DatabaseError(_) | RoostError::InternalError(_) => "Internal Server Error",
        }
    }
}

// Messages shared between services and tests
pub const LISTING_NOT_FOUND: &str = "listing not found";
pub const BOOKING_NOT_FOUND: &str = "booking not found";
pub const USER_NOT_FOUND: &str = "user not found";
pub const BUSINESS_NOT_FOUND: &str = "business not found";
pub const REVIEW_NOT_FOUND: &str = "review not found";
pub const NOT_AVAILABLE: &str = "listing is not available for these dates";
pub const INVALID_DATE_ORDER: &str = "check-out date must be after check-in date";
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const EMAIL_TAKEN: &str = "email already registered";
