//! Listing persistence trait

use async_trait::async_trait;

use chrono::NaiveDate;

use crate::model::{Page, ProductInfo, ProductQuery};

#[async_trait]
pub trait ProductPersistence: Send + Sync {
    async fn product_create(&self, product: &ProductInfo) -> anyhow::Result<()>;

    async fn product_find_by_id(&self, id: &str) -> anyhow::Result<Option<ProductInfo>>;

    /// Search listings with filters, newest first
    async fn product_find_page(
        &self,
        query: &ProductQuery,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ProductInfo>>;

    async fn product_find_by_business(&self, business_id: &str)
    -> anyhow::Result<Vec<ProductInfo>>;

    /// Overwrite every editable field of an existing listing
    async fn product_update(&self, product: &ProductInfo) -> anyhow::Result<()>;

    /// Delete the listing unless a non-cancelled booking ends after `today`.
    /// Serialized with `booking_create_if_free`. Returns `false` when the
    /// listing is still booked.
    async fn product_delete_unless_booked(&self, id: &str, today: NaiveDate)
    -> anyhow::Result<bool>;
}
