//! HTTP response types for Roost server

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

impl ErrorResult {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ErrorResult {
            status_code: status.as_u16(),
            message: message.into(),
            error: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    pub fn http_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
        HttpResponseBuilder::new(status).json(ErrorResult::new(status, message))
    }

    /// 500 response; the message may echo user input so it is escaped
    pub fn http_internal_error(message: &str) -> HttpResponse {
        Self::http_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            htmlescape::encode_minimal(message),
        )
    }
}

/// Plain `{message}` acknowledgement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageResult {
    pub message: String,
}

impl MessageResult {
    pub fn http_ok(message: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(MessageResult {
            message: message.into(),
        })
    }
}
