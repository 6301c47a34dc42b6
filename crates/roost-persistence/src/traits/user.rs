//! User persistence trait

use async_trait::async_trait;

use roost_common::UserRole;

use crate::model::UserInfo;

#[async_trait]
pub trait UserPersistence: Send + Sync {
    async fn user_find_by_id(&self, id: &str) -> anyhow::Result<Option<UserInfo>>;

    /// Lookup by normalized (lowercase) email
    async fn user_find_by_email(&self, email: &str) -> anyhow::Result<Option<UserInfo>>;

    /// Insert a new user; fails if the email is already taken
    async fn user_create(&self, user: &UserInfo) -> anyhow::Result<()>;

    /// Overwrite the mutable profile fields (name, phone, avatar)
    async fn user_update_profile(&self, user: &UserInfo) -> anyhow::Result<()>;

    async fn user_update_role(&self, id: &str, role: UserRole) -> anyhow::Result<()>;
}
