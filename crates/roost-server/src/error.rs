//! Error handling for the HTTP layer
//!
//! Services return `anyhow::Result` carrying `RoostError` values. `AppError`
//! wraps them so actix-web can render the `{statusCode, message, error}` body.

use std::fmt::{Display, Formatter};

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use validator::{ValidationErrors, ValidationErrorsKind};

use roost_common::RoostError;

use crate::model::response::ErrorResult;

// Local wrapper for application errors to implement actix-web error handling
// (Cannot impl foreign trait for foreign type due to orphan rules)
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl From<RoostError> for AppError {
    fn from(value: RoostError) -> Self {
        AppError {
            inner: value.into(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(value: ValidationErrors) -> Self {
        RoostError::Validation(validation_message(&value)).into()
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

/// Flatten field errors into `"field: message; field: message"`, sorted by
/// field. Nested structs are reported as `parent.field`.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    collect_validation_errors("", errors, &mut parts);
    parts.sort();
    parts.join("; ")
}

fn collect_validation_errors(prefix: &str, errors: &ValidationErrors, parts: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                let detail = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!("{}: {}", path, detail));
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_errors(&path, inner, parts);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_errors(&format!("{}[{}]", path, index), inner, parts);
                }
            }
        }
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.downcast_ref::<RoostError>()
            .and_then(|e| StatusCode::from_u16(e.status_code()).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        match self.downcast_ref::<RoostError>() {
            Some(RoostError::DatabaseError(message) | RoostError::InternalError(message)) => {
                tracing::error!("Request failed: {}", message);
                ErrorResult::http_internal_error(message)
            }
            Some(e) => HttpResponseBuilder::new(self.status_code()).json(ErrorResult {
                status_code: e.status_code(),
                message: e.to_string(),
                error: e.error_name().to_string(),
            }),
            None => {
                tracing::error!("Unhandled error: {:#}", self.inner);
                ErrorResult::http_internal_error(&self.inner.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 2, message = "too short"))]
        name: String,
        #[validate(range(min = 1))]
        guests: i32,
    }

    #[test]
    fn test_status_mapping() {
        let err: AppError = RoostError::not_found("listing not found").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: AppError = RoostError::forbidden("nope").into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        let signup = Signup {
            name: "a".to_string(),
            guests: 0,
        };
        let errors = signup.validate().unwrap_err();
        assert_eq!(validation_message(&errors), "guests: range; name: too short");

        let err: AppError = errors.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
