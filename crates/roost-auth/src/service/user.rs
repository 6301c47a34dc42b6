//! Account registration and credential checks

use roost_common::{
    RoostError, UserRole,
    error::{EMAIL_TAKEN, INVALID_CREDENTIALS},
    normalize_email,
};
use roost_persistence::{PersistenceService, UserInfo};

use crate::model::LoginResult;
use crate::service::{auth, password};

/// Registration input, already validated for shape by the caller
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

pub async fn register(
    persistence: &dyn PersistenceService,
    account: NewAccount,
    bcrypt_cost: u32,
) -> anyhow::Result<UserInfo> {
    let email = normalize_email(&account.email);

    if persistence.user_find_by_email(&email).await?.is_some() {
        return Err(RoostError::bad_request(EMAIL_TAKEN).into());
    }

    let hashed_password = password::hash_password(&account.password, bcrypt_cost)?;
    let now = chrono::Utc::now().timestamp_millis();

    let user = UserInfo {
        id: uuid::Uuid::new_v4().to_string(),
        name: account.name.trim().to_string(),
        email,
        password: hashed_password,
        role: UserRole::User,
        phone: account.phone,
        avatar: None,
        created_time: now,
        modified_time: now,
    };

    persistence.user_create(&user).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Unknown email and wrong password fail the same way
pub async fn authenticate(
    persistence: &dyn PersistenceService,
    email: &str,
    raw_password: &str,
) -> anyhow::Result<UserInfo> {
    match persistence
        .user_find_by_email(&normalize_email(email))
        .await?
    {
        Some(user) if password::verify_password(raw_password, &user.password) => Ok(user),
        _ => Err(RoostError::unauthorized(INVALID_CREDENTIALS).into()),
    }
}

pub async fn login(
    persistence: &dyn PersistenceService,
    email: &str,
    raw_password: &str,
    secret_key: &str,
    expire_seconds: i64,
) -> anyhow::Result<LoginResult> {
    let user = authenticate(persistence, email, raw_password).await?;

    let access_token = auth::encode_jwt_token(&user.id, user.role, secret_key, expire_seconds)
        .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))?;

    Ok(LoginResult {
        access_token,
        token_ttl: expire_seconds,
        user_id: user.id,
        role: user.role,
    })
}
