//! Authentication models
//!
//! This file defines the JWT payload, the per-request auth context and the
//! configuration keys of the auth subsystem.

use jsonwebtoken::errors::ErrorKind;
use serde::{Deserialize, Serialize};

use roost_common::UserRole;

// Auth configuration keys
pub const TOKEN_SECRET_KEY: &str = "roost.auth.token.secret.key";
pub const DEFAULT_TOKEN_SECRET_KEY: &str = "";
pub const TOKEN_EXPIRE_SECONDS: &str = "roost.auth.token.expire.seconds";
pub const DEFAULT_TOKEN_EXPIRE_SECONDS: i64 = 18000;
pub const BCRYPT_COST: &str = "roost.auth.bcrypt.cost";
pub const DEFAULT_BCRYPT_COST: u32 = 10;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";

// Cookies set on login
pub const TOKEN_COOKIE: &str = "token";
pub const ROLE_COOKIE: &str = "role";
pub const USER_ID_COOKIE: &str = "userId";

/// JWT payload for Roost authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoostJwtPayload {
    /// User id
    pub sub: String,
    pub role: UserRole,
    pub exp: i64,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub access_token: String,
    pub token_ttl: i64,
    pub user_id: String,
    pub role: UserRole,
}

/// Auth context passed through request extensions
#[derive(Debug, Default, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub role: UserRole,
    pub jwt_error: Option<jsonwebtoken::errors::Error>,
    pub token_provided: bool,
}

impl AuthContext {
    pub fn from_claims(claims: RoostJwtPayload) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            jwt_error: None,
            token_provided: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token_provided && self.jwt_error.is_none() && !self.user_id.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// The caller is `user_id` or an admin
    pub fn is_self_or_admin(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.is_admin()
    }

    pub fn jwt_error_string(&self) -> String {
        if let Some(e) = &self.jwt_error {
            match e.kind() {
                ErrorKind::ExpiredSignature => "token expired!".to_string(),
                _ => e.to_string(),
            }
        } else {
            String::default()
        }
    }
}
