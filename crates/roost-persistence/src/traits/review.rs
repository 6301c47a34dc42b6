//! Review persistence trait

use async_trait::async_trait;

use crate::model::{InsertOutcome, ReviewInfo};

#[async_trait]
pub trait ReviewPersistence: Send + Sync {
    /// Insert the review unless its author already reviewed the listing, then
    /// store the listing's recomputed rating in the same atomic step.
    async fn review_create_if_absent(&self, review: &ReviewInfo) -> anyhow::Result<InsertOutcome>;

    async fn review_find_by_id(&self, id: &str) -> anyhow::Result<Option<ReviewInfo>>;

    /// Reviews of a listing, newest first
    async fn review_find_by_product(&self, product_id: &str) -> anyhow::Result<Vec<ReviewInfo>>;

    /// Remove the review and refresh its listing's rating atomically
    async fn review_delete(&self, id: &str) -> anyhow::Result<()>;
}
