//! Process-local persistence backend
//!
//! Keeps every table in a `HashMap` behind a `parking_lot::RwLock`. Used for
//! single-node development and by the test suites. Nothing survives a
//! restart.
//!
//! Operations that touch several tables take the guards in the order
//! products, bookings, reviews.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use roost_common::{BookingStatus, StayRange, UserRole, average_rating};

use crate::model::*;
use crate::traits::*;

#[derive(Default)]
pub struct MemoryPersistService {
    users: RwLock<HashMap<String, UserInfo>>,
    businesses: RwLock<HashMap<String, BusinessInfo>>,
    products: RwLock<HashMap<String, ProductInfo>>,
    bookings: RwLock<HashMap<String, BookingInfo>>,
    reviews: RwLock<HashMap<String, ReviewInfo>>,
}

impl MemoryPersistService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone>(mut items: Vec<T>, page_no: u64, page_size: u64) -> Page<T> {
    let total_count = items.len() as u64;
    if total_count == 0 {
        return Page::empty();
    }

    let offset = usize::try_from(Page::<T>::offset(page_no, page_size)).unwrap_or(usize::MAX);
    let page_items = if offset >= items.len() {
        Vec::new()
    } else {
        items
            .drain(offset..)
            .take(page_size as usize)
            .collect::<Vec<_>>()
    };

    Page::new(total_count, page_no, page_size, page_items)
}

fn conflicts_in<'a>(
    bookings: impl Iterator<Item = &'a BookingInfo>,
    product_id: &str,
    stay: &StayRange,
) -> Vec<BookingInfo> {
    bookings
        .filter(|b| b.product_id == product_id)
        .filter(|b| b.status.blocks_dates())
        .filter(|b| stay.conflicts_with(&b.stay()))
        .cloned()
        .collect()
}

fn refresh_rating(product: &mut ProductInfo, reviews: &HashMap<String, ReviewInfo>) {
    let ratings: Vec<i32> = reviews
        .values()
        .filter(|r| r.product_id == product.id)
        .map(|r| r.rating)
        .collect();
    product.average_rating = average_rating(&ratings);
    product.review_count = ratings.len() as i32;
}

#[async_trait]
impl PersistenceService for MemoryPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::Memory
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UserPersistence for MemoryPersistService {
    async fn user_find_by_id(&self, id: &str) -> anyhow::Result<Option<UserInfo>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn user_find_by_email(&self, email: &str) -> anyhow::Result<Option<UserInfo>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn user_create(&self, user: &UserInfo) -> anyhow::Result<()> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == user.email) {
            anyhow::bail!("Duplicate email: {}", user.email);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn user_update_profile(&self, user: &UserInfo) -> anyhow::Result<()> {
        let mut users = self.users.write();
        match users.get_mut(&user.id) {
            Some(existing) => {
                existing.name = user.name.clone();
                existing.phone = user.phone.clone();
                existing.avatar = user.avatar.clone();
                existing.modified_time = user.modified_time;
                Ok(())
            }
            None => Err(anyhow::anyhow!("User not found: {}", user.id)),
        }
    }

    async fn user_update_role(&self, id: &str, role: UserRole) -> anyhow::Result<()> {
        if let Some(user) = self.users.write().get_mut(id) {
            user.role = role;
            user.modified_time = chrono::Utc::now().timestamp_millis();
        }
        Ok(())
    }
}

#[async_trait]
impl BusinessPersistence for MemoryPersistService {
    async fn business_create(&self, business: &BusinessInfo) -> anyhow::Result<()> {
        let mut businesses = self.businesses.write();
        if businesses.values().any(|b| b.owner == business.owner) {
            anyhow::bail!("Duplicate business owner: {}", business.owner);
        }
        businesses.insert(business.id.clone(), business.clone());
        Ok(())
    }

    async fn business_find_by_id(&self, id: &str) -> anyhow::Result<Option<BusinessInfo>> {
        Ok(self.businesses.read().get(id).cloned())
    }

    async fn business_find_by_owner(&self, owner: &str) -> anyhow::Result<Option<BusinessInfo>> {
        Ok(self
            .businesses
            .read()
            .values()
            .find(|b| b.owner == owner)
            .cloned())
    }

    async fn business_find_page(
        &self,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<BusinessInfo>> {
        let mut items: Vec<BusinessInfo> = self.businesses.read().values().cloned().collect();
        items.sort_by(|a, b| {
            b.created_time
                .cmp(&a.created_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(paginate(items, page_no, page_size))
    }
}

#[async_trait]
impl ProductPersistence for MemoryPersistService {
    async fn product_create(&self, product: &ProductInfo) -> anyhow::Result<()> {
        self.products
            .write()
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn product_find_by_id(&self, id: &str) -> anyhow::Result<Option<ProductInfo>> {
        Ok(self.products.read().get(id).cloned())
    }

    async fn product_find_page(
        &self,
        query: &ProductQuery,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ProductInfo>> {
        let mut items: Vec<ProductInfo> = self
            .products
            .read()
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.created_time
                .cmp(&a.created_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(paginate(items, page_no, page_size))
    }

    async fn product_find_by_business(
        &self,
        business_id: &str,
    ) -> anyhow::Result<Vec<ProductInfo>> {
        let mut items: Vec<ProductInfo> = self
            .products
            .read()
            .values()
            .filter(|p| p.business_id == business_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_time.cmp(&a.created_time));
        Ok(items)
    }

    async fn product_update(&self, product: &ProductInfo) -> anyhow::Result<()> {
        let mut products = self.products.write();
        match products.get_mut(&product.id) {
            Some(existing) => {
                // Identity, ownership and aggregates are not editable
                let updated = ProductInfo {
                    business_id: existing.business_id.clone(),
                    owner: existing.owner.clone(),
                    average_rating: existing.average_rating,
                    review_count: existing.review_count,
                    created_time: existing.created_time,
                    ..product.clone()
                };
                *existing = updated;
                Ok(())
            }
            None => Err(anyhow::anyhow!("Product not found: {}", product.id)),
        }
    }

    async fn product_delete_unless_booked(
        &self,
        id: &str,
        today: NaiveDate,
    ) -> anyhow::Result<bool> {
        let mut products = self.products.write();
        let bookings = self.bookings.read();

        let upcoming = bookings
            .values()
            .any(|b| b.product_id == id && b.status.blocks_dates() && b.check_out > today);
        if upcoming {
            return Ok(false);
        }

        products.remove(id);
        Ok(true)
    }
}

#[async_trait]
impl BookingPersistence for MemoryPersistService {
    async fn booking_create_if_free(
        &self,
        booking: &BookingInfo,
    ) -> anyhow::Result<InsertOutcome> {
        // The products guard keeps the listing from being deleted meanwhile
        let products = self.products.read();
        if !products.contains_key(&booking.product_id) {
            return Ok(InsertOutcome::ListingMissing);
        }

        let mut bookings = self.bookings.write();
        if !conflicts_in(bookings.values(), &booking.product_id, &booking.stay()).is_empty() {
            return Ok(InsertOutcome::Conflict);
        }
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(InsertOutcome::Created)
    }

    async fn booking_find_by_id(&self, id: &str) -> anyhow::Result<Option<BookingInfo>> {
        Ok(self.bookings.read().get(id).cloned())
    }

    async fn booking_find_by_user(&self, user_id: &str) -> anyhow::Result<Vec<BookingInfo>> {
        let mut items: Vec<BookingInfo> = self
            .bookings
            .read()
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.created_time
                .cmp(&a.created_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(items)
    }

    async fn booking_find_by_product(&self, product_id: &str) -> anyhow::Result<Vec<BookingInfo>> {
        let mut items: Vec<BookingInfo> = self
            .bookings
            .read()
            .values()
            .filter(|b| b.product_id == product_id)
            .cloned()
            .collect();
        items.sort_by_key(|b| b.check_in);
        Ok(items)
    }

    async fn booking_update_status(&self, id: &str, status: BookingStatus) -> anyhow::Result<()> {
        match self.bookings.write().get_mut(id) {
            Some(booking) => {
                booking.status = status;
                Ok(())
            }
            None => Err(anyhow::anyhow!("Booking not found: {}", id)),
        }
    }
}

#[async_trait]
impl ReviewPersistence for MemoryPersistService {
    async fn review_create_if_absent(&self, review: &ReviewInfo) -> anyhow::Result<InsertOutcome> {
        let mut products = self.products.write();
        let Some(product) = products.get_mut(&review.product_id) else {
            return Ok(InsertOutcome::ListingMissing);
        };

        let mut reviews = self.reviews.write();
        if reviews
            .values()
            .any(|r| r.user_id == review.user_id && r.product_id == review.product_id)
        {
            return Ok(InsertOutcome::Conflict);
        }

        reviews.insert(review.id.clone(), review.clone());
        refresh_rating(product, &reviews);
        Ok(InsertOutcome::Created)
    }

    async fn review_find_by_id(&self, id: &str) -> anyhow::Result<Option<ReviewInfo>> {
        Ok(self.reviews.read().get(id).cloned())
    }

    async fn review_find_by_product(&self, product_id: &str) -> anyhow::Result<Vec<ReviewInfo>> {
        let mut items: Vec<ReviewInfo> = self
            .reviews
            .read()
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_time.cmp(&a.created_time));
        Ok(items)
    }

    async fn review_delete(&self, id: &str) -> anyhow::Result<()> {
        let mut products = self.products.write();
        let mut reviews = self.reviews.write();

        if let Some(removed) = reviews.remove(id)
            && let Some(product) = products.get_mut(&removed.product_id)
        {
            refresh_rating(product, &reviews);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn booking(id: &str, check_in: NaiveDate, check_out: NaiveDate) -> BookingInfo {
        BookingInfo {
            id: id.to_string(),
            product_id: "p1".to_string(),
            user_id: "u1".to_string(),
            check_in,
            check_out,
            guests: 2,
            nights: (check_out - check_in).num_days() as i32,
            total_price: 100.0,
            status: BookingStatus::Confirmed,
            created_time: 0,
        }
    }

    fn listing(id: &str) -> ProductInfo {
        ProductInfo {
            id: id.to_string(),
            business_id: "biz".to_string(),
            owner: "host".to_string(),
            title: "Cabin".to_string(),
            description: String::new(),
            category: "cabin".to_string(),
            location: Location::default(),
            price: 80.0,
            max_guests: 4,
            bedrooms: 1,
            beds: 1,
            bathrooms: 1,
            amenities: vec![],
            images: vec![],
            average_rating: 0.0,
            review_count: 0,
            created_time: 0,
            modified_time: 0,
        }
    }

    fn review(id: &str, user_id: &str, rating: i32) -> ReviewInfo {
        ReviewInfo {
            id: id.to_string(),
            product_id: "p1".to_string(),
            user_id: user_id.to_string(),
            rating,
            comment: "ok".to_string(),
            created_time: 0,
        }
    }

    async fn store_with_listing() -> MemoryPersistService {
        let store = MemoryPersistService::new();
        store.product_create(&listing("p1")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_if_free_rejects_overlap() {
        let store = store_with_listing().await;

        let outcome = store
            .booking_create_if_free(&booking("b1", day(6, 1), day(6, 5)))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Created);

        let outcome = store
            .booking_create_if_free(&booking("b2", day(6, 4), day(6, 6)))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Conflict);

        // Check-out day is free for the next guest
        let outcome = store
            .booking_create_if_free(&booking("b3", day(6, 5), day(6, 8)))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Created);

        let all = store.booking_find_by_product("p1").await.unwrap();
        let ids: Vec<&str> = all.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b3"]);
    }

    #[tokio::test]
    async fn test_create_if_free_without_listing() {
        let store = MemoryPersistService::new();

        let outcome = store
            .booking_create_if_free(&booking("b1", day(6, 1), day(6, 5)))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::ListingMissing);
        assert!(store.booking_find_by_product("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_booking_releases_dates() {
        let store = store_with_listing().await;
        store
            .booking_create_if_free(&booking("b1", day(6, 1), day(6, 5)))
            .await
            .unwrap();
        store
            .booking_update_status("b1", BookingStatus::Cancelled)
            .await
            .unwrap();

        let outcome = store
            .booking_create_if_free(&booking("b2", day(6, 2), day(6, 3)))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Created);
    }

    #[tokio::test]
    async fn test_delete_unless_booked() {
        let store = store_with_listing().await;
        store
            .booking_create_if_free(&booking("b1", day(6, 1), day(6, 5)))
            .await
            .unwrap();

        assert!(!store.product_delete_unless_booked("p1", day(6, 4)).await.unwrap());
        assert!(store.product_find_by_id("p1").await.unwrap().is_some());

        // A stay ending today no longer blocks removal
        assert!(store.product_delete_unless_booked("p1", day(6, 5)).await.unwrap());
        assert!(store.product_find_by_id("p1").await.unwrap().is_none());

        let outcome = store
            .booking_create_if_free(&booking("b2", day(7, 1), day(7, 3)))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::ListingMissing);
    }

    #[tokio::test]
    async fn test_review_once_per_user_and_rating() {
        let store = store_with_listing().await;

        let outcome = store.review_create_if_absent(&review("r1", "u1", 5)).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Created);
        let outcome = store.review_create_if_absent(&review("r2", "u1", 1)).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Conflict);
        let outcome = store.review_create_if_absent(&review("r3", "u2", 4)).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Created);

        let product = store.product_find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.review_count, 2);
        assert_eq!(product.average_rating, 4.5);

        store.review_delete("r1").await.unwrap();
        let product = store.product_find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.review_count, 1);
        assert_eq!(product.average_rating, 4.0);

        let orphan = ReviewInfo {
            product_id: "gone".to_string(),
            ..review("r4", "u3", 3)
        };
        let outcome = store.review_create_if_absent(&orphan).await.unwrap();
        assert_eq!(outcome, InsertOutcome::ListingMissing);
    }

    #[tokio::test]
    async fn test_concurrent_reviews_single_winner() {
        let store = std::sync::Arc::new(store_with_listing().await);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .review_create_if_absent(&review(&format!("r{}", i), "u1", 5))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap() == InsertOutcome::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.review_find_by_product("p1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_missing_booking() {
        let store = MemoryPersistService::new();
        assert!(
            store
                .booking_update_status("missing", BookingStatus::Cancelled)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_user_email_unique() {
        let store = MemoryPersistService::new();
        let user = UserInfo {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "hash".to_string(),
            role: UserRole::User,
            phone: None,
            avatar: None,
            created_time: 0,
            modified_time: 0,
        };
        store.user_create(&user).await.unwrap();

        let dup = UserInfo {
            id: "u2".to_string(),
            ..user.clone()
        };
        assert!(store.user_create(&dup).await.is_err());

        store.user_update_role("u1", UserRole::Business).await.unwrap();
        let found = store
            .user_find_by_email("ana@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.role, UserRole::Business);
    }

    #[test]
    fn test_paginate() {
        let page = paginate((1..=45).collect::<Vec<_>>(), 3, 20);
        assert_eq!(page.total_count, 45);
        assert_eq!(page.pages_available, 3);
        assert_eq!(page.page_items, (41..=45).collect::<Vec<_>>());

        let beyond = paginate(vec![1, 2], 5, 20);
        assert!(beyond.page_items.is_empty());
        assert_eq!(beyond.total_count, 2);

        let far = paginate(vec![1, 2], u64::MAX, 100);
        assert!(far.page_items.is_empty());
    }
}
