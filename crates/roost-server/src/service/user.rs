//! Profiles and the business (host) upgrade

use tracing::info;

use roost_auth::AuthContext;
use roost_common::{
    RoostError, UserRole,
    error::{BUSINESS_NOT_FOUND, USER_NOT_FOUND},
    normalize_email,
};
use roost_persistence::{BusinessInfo, Page, PersistenceService, UserInfo};

use crate::model::request::{RegisterBusinessRequest, UpdateProfileRequest};

async fn find_user(persistence: &dyn PersistenceService, id: &str) -> anyhow::Result<UserInfo> {
    persistence
        .user_find_by_id(id)
        .await?
        .ok_or_else(|| RoostError::not_found(USER_NOT_FOUND).into())
}

/// A profile is visible to its owner and to admins
pub async fn get(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
) -> anyhow::Result<UserInfo> {
    if !ctx.is_self_or_admin(id) {
        return Err(RoostError::forbidden("not allowed to view this profile").into());
    }
    find_user(persistence, id).await
}

pub async fn update_profile(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
    req: UpdateProfileRequest,
) -> anyhow::Result<UserInfo> {
    if ctx.user_id != id {
        return Err(RoostError::forbidden("only the account owner can edit this profile").into());
    }

    let mut user = find_user(persistence, id).await?;
    if let Some(name) = req.name {
        user.name = name.trim().to_string();
    }
    if let Some(phone) = req.phone {
        user.phone = Some(phone);
    }
    if let Some(avatar) = req.avatar {
        user.avatar = Some(avatar);
    }
    user.modified_time = chrono::Utc::now().timestamp_millis();

    persistence.user_update_profile(&user).await?;
    Ok(user)
}

/// Create the caller's business and make them a host.
pub async fn register_business(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
    req: RegisterBusinessRequest,
) -> anyhow::Result<BusinessInfo> {
    if ctx.user_id != id {
        return Err(RoostError::forbidden("only the account owner can register a business").into());
    }

    let user = find_user(persistence, id).await?;

    if persistence.business_find_by_owner(&user.id).await?.is_some() {
        return Err(RoostError::bad_request("business already registered").into());
    }

    let business = BusinessInfo {
        id: uuid::Uuid::new_v4().to_string(),
        owner: user.id.clone(),
        name: req.name.trim().to_string(),
        description: req.description,
        phone: req.phone,
        email: normalize_email(&req.email),
        address: req.address,
        created_time: chrono::Utc::now().timestamp_millis(),
    };

    persistence.business_create(&business).await?;

    // admins keep their role
    if user.role == UserRole::User {
        persistence.user_update_role(&user.id, UserRole::Business).await?;
    }

    info!(user_id = %user.id, business_id = %business.id, "Business registered");
    Ok(business)
}

pub async fn get_business(
    persistence: &dyn PersistenceService,
    id: &str,
) -> anyhow::Result<BusinessInfo> {
    persistence
        .business_find_by_id(id)
        .await?
        .ok_or_else(|| RoostError::not_found(BUSINESS_NOT_FOUND).into())
}

pub async fn get_business_by_owner(
    persistence: &dyn PersistenceService,
    owner: &str,
) -> anyhow::Result<BusinessInfo> {
    persistence
        .business_find_by_owner(owner)
        .await?
        .ok_or_else(|| RoostError::not_found(BUSINESS_NOT_FOUND).into())
}

pub async fn list_businesses(
    persistence: &dyn PersistenceService,
    page_no: u64,
    page_size: u64,
) -> anyhow::Result<Page<BusinessInfo>> {
    persistence.business_find_page(page_no, page_size).await
}
