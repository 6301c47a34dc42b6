//! Business persistence trait

use async_trait::async_trait;

use crate::model::{BusinessInfo, Page};

#[async_trait]
pub trait BusinessPersistence: Send + Sync {
    async fn business_create(&self, business: &BusinessInfo) -> anyhow::Result<()>;

    async fn business_find_by_id(&self, id: &str) -> anyhow::Result<Option<BusinessInfo>>;

    async fn business_find_by_owner(&self, owner: &str) -> anyhow::Result<Option<BusinessInfo>>;

    async fn business_find_page(
        &self,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<BusinessInfo>>;
}
