//! Reservations and the availability check
//!
//! Check-then-insert for one listing is serialized by an async mutex keyed
//! by listing id. Storage backends make the insert itself atomic as well,
//! so the per-process lock only removes contention, not correctness.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use roost_auth::AuthContext;
use roost_common::{
    BookingStatus, RoostError, StayRange,
    error::{BOOKING_NOT_FOUND, LISTING_NOT_FOUND, NOT_AVAILABLE},
};
use roost_persistence::{BookingInfo, InsertOutcome, PersistenceService, ProductInfo};

use crate::metrics;

/// Validated booking input
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub product_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

pub struct BookingService {
    persistence: Arc<dyn PersistenceService>,
    listing_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl BookingService {
    pub fn new(persistence: Arc<dyn PersistenceService>) -> Self {
        Self {
            persistence,
            listing_locks: DashMap::new(),
        }
    }

    fn listing_lock(&self, product_id: &str) -> Arc<Mutex<()>> {
        self.listing_locks
            .entry(product_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the map entry once no other request holds a handle to it
    fn release_listing_lock(&self, product_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.listing_locks
            .remove_if(product_id, |_, l| Arc::strong_count(l) == 1);
    }

    /// Reserve a listing for `[check_in, check_out)`.
    ///
    /// Order of checks: date order, listing existence, guest capacity,
    /// then overlap with non-cancelled bookings.
    pub async fn create(&self, user_id: &str, input: NewBooking) -> anyhow::Result<BookingInfo> {
        let stay = match StayRange::new(input.check_in, input.check_out) {
            Ok(stay) => stay,
            Err(e) => {
                metrics::record_booking_rejected("invalid_dates");
                return Err(e.into());
            }
        };

        let product = self
            .persistence
            .product_find_by_id(&input.product_id)
            .await?
            .ok_or_else(|| RoostError::not_found(LISTING_NOT_FOUND))?;

        if input.guests > product.max_guests {
            metrics::record_booking_rejected("too_many_guests");
            return Err(RoostError::bad_request(format!(
                "listing accepts at most {} guests",
                product.max_guests
            ))
            .into());
        }

        let booking = new_booking(&product, user_id, &stay, input.guests);

        let lock = self.listing_lock(&product.id);
        let outcome = {
            let _guard = lock.lock().await;
            self.persistence.booking_create_if_free(&booking).await
        };
        self.release_listing_lock(&product.id, lock);

        match outcome? {
            InsertOutcome::Created => {}
            InsertOutcome::Conflict => {
                metrics::record_booking_rejected("overlap");
                debug!(product_id = %product.id, stay = %stay, "Booking rejected, dates taken");
                return Err(RoostError::bad_request(NOT_AVAILABLE).into());
            }
            InsertOutcome::ListingMissing => {
                debug!(product_id = %product.id, "Booking rejected, listing deleted meanwhile");
                return Err(RoostError::not_found(LISTING_NOT_FOUND).into());
            }
        }

        metrics::record_booking_created();
        info!(
            booking_id = %booking.id,
            product_id = %booking.product_id,
            user_id = %booking.user_id,
            stay = %stay,
            "Booking created"
        );

        Ok(booking)
    }

    /// Visible to the guest, the listing's host and admins
    pub async fn get(&self, ctx: &AuthContext, id: &str) -> anyhow::Result<BookingInfo> {
        let booking = self.find(id).await?;

        if ctx.is_self_or_admin(&booking.user_id) {
            return Ok(booking);
        }

        let host = self
            .persistence
            .product_find_by_id(&booking.product_id)
            .await?
            .map(|p| p.owner);
        if host.as_deref() == Some(ctx.user_id.as_str()) {
            return Ok(booking);
        }

        Err(RoostError::forbidden("not allowed to view this booking").into())
    }

    pub async fn list_for_user(&self, user_id: &str) -> anyhow::Result<Vec<BookingInfo>> {
        self.persistence.booking_find_by_user(user_id).await
    }

    /// All bookings of a listing, for its host
    pub async fn list_for_product(
        &self,
        ctx: &AuthContext,
        product_id: &str,
    ) -> anyhow::Result<Vec<BookingInfo>> {
        let product = self.find_product(product_id).await?;

        if !ctx.is_self_or_admin(&product.owner) {
            return Err(RoostError::forbidden("only the host can list these bookings").into());
        }

        self.persistence.booking_find_by_product(product_id).await
    }

    /// Booked, non-cancelled ranges of a listing ordered by check-in
    pub async fn availability(&self, product_id: &str) -> anyhow::Result<Vec<StayRange>> {
        self.find_product(product_id).await?;

        Ok(self
            .persistence
            .booking_find_by_product(product_id)
            .await?
            .into_iter()
            .filter(|b| b.status.blocks_dates())
            .map(|b| b.stay())
            .collect())
    }

    pub async fn cancel(&self, ctx: &AuthContext, id: &str) -> anyhow::Result<BookingInfo> {
        self.cancel_on(ctx, id, super::today()).await
    }

    /// Cancel as of `today`; stays that already started cannot be cancelled.
    pub async fn cancel_on(
        &self,
        ctx: &AuthContext,
        id: &str,
        today: NaiveDate,
    ) -> anyhow::Result<BookingInfo> {
        let mut booking = self.find(id).await?;

        if !ctx.is_self_or_admin(&booking.user_id) {
            return Err(RoostError::forbidden("not allowed to cancel this booking").into());
        }

        if booking.status == BookingStatus::Cancelled {
            return Err(RoostError::bad_request("booking is already cancelled").into());
        }

        if booking.stay().starts_before(today) {
            warn!(booking_id = %booking.id, check_in = %booking.check_in, "Refused to cancel a past booking");
            return Err(RoostError::bad_request("cannot cancel a booking in the past").into());
        }

        self.persistence
            .booking_update_status(&booking.id, BookingStatus::Cancelled)
            .await?;
        booking.status = BookingStatus::Cancelled;

        metrics::record_booking_cancelled();
        info!(booking_id = %booking.id, "Booking cancelled");

        Ok(booking)
    }

    async fn find(&self, id: &str) -> anyhow::Result<BookingInfo> {
        self.persistence
            .booking_find_by_id(id)
            .await?
            .ok_or_else(|| RoostError::not_found(BOOKING_NOT_FOUND).into())
    }

    async fn find_product(&self, product_id: &str) -> anyhow::Result<ProductInfo> {
        self.persistence
            .product_find_by_id(product_id)
            .await?
            .ok_or_else(|| RoostError::not_found(LISTING_NOT_FOUND).into())
    }
}

fn new_booking(product: &ProductInfo, user_id: &str, stay: &StayRange, guests: i32) -> BookingInfo {
    let nights = stay.nights();
    let total_price = (product.price * nights as f64 * 100.0).round() / 100.0;

    BookingInfo {
        id: uuid::Uuid::new_v4().to_string(),
        product_id: product.id.clone(),
        user_id: user_id.to_string(),
        check_in: stay.check_in,
        check_out: stay.check_out,
        guests,
        nights: nights as i32,
        total_price,
        status: BookingStatus::Confirmed,
        created_time: chrono::Utc::now().timestamp_millis(),
    }
}
