//! Booking persistence trait

use async_trait::async_trait;

use roost_common::BookingStatus;

use crate::model::{BookingInfo, InsertOutcome};

#[async_trait]
pub trait BookingPersistence: Send + Sync {
    /// Insert the booking unless a non-cancelled booking of the same listing
    /// overlaps it or the listing is gone. The checks and the insert are one
    /// atomic step within the backend.
    async fn booking_create_if_free(&self, booking: &BookingInfo)
    -> anyhow::Result<InsertOutcome>;

    async fn booking_find_by_id(&self, id: &str) -> anyhow::Result<Option<BookingInfo>>;

    /// Bookings of a user, newest first
    async fn booking_find_by_user(&self, user_id: &str) -> anyhow::Result<Vec<BookingInfo>>;

    /// Bookings of a listing ordered by check-in
    async fn booking_find_by_product(&self, product_id: &str) -> anyhow::Result<Vec<BookingInfo>>;

    async fn booking_update_status(&self, id: &str, status: BookingStatus) -> anyhow::Result<()>;
}
