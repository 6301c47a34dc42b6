//! JWT token service

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;

use roost_common::UserRole;

use crate::model::RoostJwtPayload;

/// Verified tokens, keyed by the raw token
static TOKEN_CACHE: LazyLock<Cache<String, RoostJwtPayload>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300))
        .build()
});

/// Decode and validate JWT token with caching
pub fn decode_jwt_token_cached(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<RoostJwtPayload> {
    if let Some(claims) = TOKEN_CACHE.get(token) {
        if claims.exp > chrono::Utc::now().timestamp() {
            return Ok(claims);
        }
        TOKEN_CACHE.invalidate(token);
    }

    let claims = decode_jwt_token(token, secret_key)?;
    TOKEN_CACHE.insert(token.to_string(), claims.clone());

    Ok(claims)
}

/// Decode and validate JWT token without caching
pub fn decode_jwt_token(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<RoostJwtPayload> {
    let decoding_key = DecodingKey::from_base64_secret(secret_key)?;
    let data = decode::<RoostJwtPayload>(
        token,
        &decoding_key,
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// Evict a token from the cache, used on logout
pub fn invalidate_token(token: &str) {
    TOKEN_CACHE.invalidate(token);
}

/// Encode a JWT token for `user_id` valid for `expire_seconds`
pub fn encode_jwt_token(
    user_id: &str,
    role: UserRole,
    secret_key: &str,
    expire_seconds: i64,
) -> jsonwebtoken::errors::Result<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(expire_seconds))
        .unwrap_or_else(chrono::Utc::now)
        .timestamp();

    let payload = RoostJwtPayload {
        sub: user_id.to_string(),
        role,
        exp,
    };

    let encoding_key = EncodingKey::from_base64_secret(secret_key)?;
    encode(&Header::new(Algorithm::HS256), &payload, &encoding_key)
}
