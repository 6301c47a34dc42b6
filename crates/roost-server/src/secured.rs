// Access guard for JWT-protected handlers

use actix_web::{HttpMessage, HttpRequest};

use roost_auth::AuthContext;
use roost_common::RoostError;

use crate::error::AppError;

/// The caller's identity, or 401 when the request carries no valid token.
///
/// Relies on the `Authentication` middleware having populated the request
/// extensions.
pub fn require_auth(req: &HttpRequest) -> Result<AuthContext, AppError> {
    let auth_context = req.extensions().get::<AuthContext>().cloned();

    match auth_context {
        None => Err(RoostError::unauthorized("no auth context found").into()),
        Some(ctx) if !ctx.token_provided => {
            Err(RoostError::unauthorized("no token provided").into())
        }
        Some(ctx) if ctx.jwt_error.is_some() => {
            Err(RoostError::unauthorized(ctx.jwt_error_string()).into())
        }
        Some(ctx) if !ctx.is_authenticated() => {
            Err(RoostError::unauthorized("invalid token").into())
        }
        Some(ctx) => Ok(ctx),
    }
}
