//! SQL-based persistence backend (MySQL/PostgreSQL via SeaORM)
//!
//! This module implements the `PersistenceService` trait with direct SeaORM
//! queries against the entities in `crate::entity`.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{
    prelude::Expr,
    sea_query::{Asterisk, Func, Index, IndexCreateStatement},
    *,
};

use roost_common::{BookingStatus, StayRange, UserRole, average_rating};

use crate::entity::{bookings, businesses, products, reviews, users};
use crate::model::*;
use crate::traits::*;

/// External database persistence service
///
/// Wraps a SeaORM `DatabaseConnection` and implements all persistence traits
/// by delegating to direct database queries.
pub struct ExternalDbPersistService {
    db: DatabaseConnection,
}

impl ExternalDbPersistService {
    /// Create a new ExternalDbPersistService with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create missing tables and indexes from the entity definitions
    pub async fn sync_schema(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let tables = [
            schema
                .create_table_from_entity(users::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(businesses::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(products::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(bookings::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(reviews::Entity)
                .if_not_exists()
                .to_owned(),
        ];

        for table in tables {
            self.db.execute(backend.build(&table)).await?;
        }

        let indexes = schema
            .create_index_from_entity(bookings::Entity)
            .into_iter()
            .chain(schema.create_index_from_entity(reviews::Entity))
            .chain(std::iter::once(review_author_index()));

        for mut index in indexes {
            // MySQL has no IF NOT EXISTS for indexes; an existing index is fine
            if let Err(e) = self
                .db
                .execute(backend.build(index.if_not_exists()))
                .await
            {
                tracing::debug!("Skipping index creation: {}", e);
            }
        }

        tracing::info!("Database schema is up to date");
        Ok(())
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn to_millis(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

fn from_millis(millis: i64) -> NaiveDateTime {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .naive_utc()
}

fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn encode_list(items: &[String]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(items)?)
}

fn user_from_model(m: users::Model) -> UserInfo {
    UserInfo {
        id: m.id,
        name: m.name,
        email: m.email,
        password: m.password,
        role: m.role.parse().unwrap_or_default(),
        phone: m.phone,
        avatar: m.avatar,
        created_time: to_millis(m.gmt_create),
        modified_time: to_millis(m.gmt_modified),
    }
}

fn business_from_model(m: businesses::Model) -> BusinessInfo {
    BusinessInfo {
        id: m.id,
        owner: m.owner,
        name: m.name,
        description: m.description,
        phone: m.phone,
        email: m.email,
        address: m.address,
        created_time: to_millis(m.gmt_create),
    }
}

fn product_from_model(m: products::Model) -> ProductInfo {
    ProductInfo {
        amenities: decode_list(&m.amenities),
        images: decode_list(&m.images),
        id: m.id,
        business_id: m.business_id,
        owner: m.owner,
        title: m.title,
        description: m.description,
        category: m.category,
        location: Location {
            address: m.address,
            city: m.city,
            country: m.country,
            lat: m.lat,
            lng: m.lng,
        },
        price: m.price,
        max_guests: m.max_guests,
        bedrooms: m.bedrooms,
        beds: m.beds,
        bathrooms: m.bathrooms,
        average_rating: m.average_rating,
        review_count: m.review_count,
        created_time: to_millis(m.gmt_create),
        modified_time: to_millis(m.gmt_modified),
    }
}

fn product_to_active(p: &ProductInfo) -> anyhow::Result<products::ActiveModel> {
    Ok(products::ActiveModel {
        id: Set(p.id.clone()),
        business_id: Set(p.business_id.clone()),
        owner: Set(p.owner.clone()),
        title: Set(p.title.clone()),
        description: Set(p.description.clone()),
        category: Set(p.category.clone()),
        address: Set(p.location.address.clone()),
        city: Set(p.location.city.clone()),
        country: Set(p.location.country.clone()),
        lat: Set(p.location.lat),
        lng: Set(p.location.lng),
        price: Set(p.price),
        max_guests: Set(p.max_guests),
        bedrooms: Set(p.bedrooms),
        beds: Set(p.beds),
        bathrooms: Set(p.bathrooms),
        amenities: Set(encode_list(&p.amenities)?),
        images: Set(encode_list(&p.images)?),
        average_rating: Set(p.average_rating),
        review_count: Set(p.review_count),
        gmt_create: Set(from_millis(p.created_time)),
        gmt_modified: Set(from_millis(p.modified_time)),
    })
}

fn booking_from_model(m: bookings::Model) -> BookingInfo {
    BookingInfo {
        id: m.id,
        product_id: m.product_id,
        user_id: m.user_id,
        check_in: m.check_in,
        check_out: m.check_out,
        guests: m.guests,
        nights: m.nights,
        total_price: m.total_price,
        status: m.status.parse().unwrap_or_default(),
        created_time: to_millis(m.gmt_create),
    }
}

fn review_from_model(m: reviews::Model) -> ReviewInfo {
    ReviewInfo {
        id: m.id,
        product_id: m.product_id,
        user_id: m.user_id,
        rating: m.rating,
        comment: m.comment,
        created_time: to_millis(m.gmt_create),
    }
}

/// One review per author and listing
fn review_author_index() -> IndexCreateStatement {
    Index::create()
        .name("uk_reviews_user_product")
        .table(reviews::Entity)
        .col(reviews::Column::UserId)
        .col(reviews::Column::ProductId)
        .unique()
        .to_owned()
}

/// Stored bookings intersecting `[check_in, check_out)`: one that covers the
/// start, one that covers the end, or one inside the range. Touching ranges
/// do not match.
fn overlap_condition(stay: &StayRange) -> Condition {
    let start = stay.check_in;
    let end = stay.check_out;

    Condition::any()
        .add(
            Condition::all()
                .add(bookings::Column::CheckIn.lte(start))
                .add(bookings::Column::CheckOut.gt(start)),
        )
        .add(
            Condition::all()
                .add(bookings::Column::CheckIn.lt(end))
                .add(bookings::Column::CheckOut.gte(end)),
        )
        .add(
            Condition::all()
                .add(bookings::Column::CheckIn.gte(start))
                .add(bookings::Column::CheckOut.lte(end)),
        )
}

fn conflicts_query(product_id: &str, stay: &StayRange) -> Select<bookings::Entity> {
    bookings::Entity::find()
        .filter(bookings::Column::ProductId.eq(product_id))
        .filter(bookings::Column::Status.ne(BookingStatus::Cancelled.as_str()))
        .filter(overlap_condition(stay))
}

/// Lock the listing row for the rest of the transaction
async fn lock_listing(txn: &DatabaseTransaction, id: &str) -> anyhow::Result<bool> {
    Ok(products::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .is_some())
}

/// Store `average_rating` and `review_count` recomputed from every review
async fn refresh_rating<C: ConnectionTrait>(conn: &C, product_id: &str) -> anyhow::Result<()> {
    let ratings = reviews::Entity::find()
        .select_only()
        .column(reviews::Column::Rating)
        .filter(reviews::Column::ProductId.eq(product_id))
        .into_tuple::<i32>()
        .all(conn)
        .await?;

    products::Entity::update_many()
        .col_expr(
            products::Column::AverageRating,
            Expr::value(average_rating(&ratings)),
        )
        .col_expr(products::Column::ReviewCount, Expr::value(ratings.len() as i32))
        .filter(products::Column::Id.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}

// ============================================================================
// PersistenceService implementation
// ============================================================================

#[async_trait]
impl PersistenceService for ExternalDbPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::ExternalDb
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        // Execute a simple query to verify connectivity
        users::Entity::find()
            .select_only()
            .column_as(Expr::cust("1"), "health")
            .into_tuple::<i32>()
            .one(&self.db)
            .await?;
        Ok(())
    }
}

// ============================================================================
// UserPersistence implementation
// ============================================================================

#[async_trait]
impl UserPersistence for ExternalDbPersistService {
    async fn user_find_by_id(&self, id: &str) -> anyhow::Result<Option<UserInfo>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(user_from_model);

        Ok(user)
    }

    async fn user_find_by_email(&self, email: &str) -> anyhow::Result<Option<UserInfo>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(user_from_model);

        Ok(user)
    }

    async fn user_create(&self, user: &UserInfo) -> anyhow::Result<()> {
        let entity = users::ActiveModel {
            id: Set(user.id.clone()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password: Set(user.password.clone()),
            role: Set(user.role.as_str().to_string()),
            phone: Set(user.phone.clone()),
            avatar: Set(user.avatar.clone()),
            gmt_create: Set(from_millis(user.created_time)),
            gmt_modified: Set(from_millis(user.modified_time)),
        };

        users::Entity::insert(entity)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn user_update_profile(&self, user: &UserInfo) -> anyhow::Result<()> {
        match users::Entity::find_by_id(user.id.as_str())
            .one(&self.db)
            .await?
        {
            Some(entity) => {
                let mut model: users::ActiveModel = entity.into();
                model.name = Set(user.name.clone());
                model.phone = Set(user.phone.clone());
                model.avatar = Set(user.avatar.clone());
                model.gmt_modified = Set(from_millis(user.modified_time));
                model.update(&self.db).await?;
                Ok(())
            }
            None => Err(anyhow::anyhow!("User not found: {}", user.id)),
        }
    }

    async fn user_update_role(&self, id: &str, role: UserRole) -> anyhow::Result<()> {
        users::Entity::update_many()
            .col_expr(users::Column::Role, Expr::value(role.as_str()))
            .col_expr(
                users::Column::GmtModified,
                Expr::value(chrono::Utc::now().naive_utc()),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

// ============================================================================
// BusinessPersistence implementation
// ============================================================================

#[async_trait]
impl BusinessPersistence for ExternalDbPersistService {
    async fn business_create(&self, business: &BusinessInfo) -> anyhow::Result<()> {
        let entity = businesses::ActiveModel {
            id: Set(business.id.clone()),
            owner: Set(business.owner.clone()),
            name: Set(business.name.clone()),
            description: Set(business.description.clone()),
            phone: Set(business.phone.clone()),
            email: Set(business.email.clone()),
            address: Set(business.address.clone()),
            gmt_create: Set(from_millis(business.created_time)),
        };

        businesses::Entity::insert(entity)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn business_find_by_id(&self, id: &str) -> anyhow::Result<Option<BusinessInfo>> {
        Ok(businesses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(business_from_model))
    }

    async fn business_find_by_owner(&self, owner: &str) -> anyhow::Result<Option<BusinessInfo>> {
        Ok(businesses::Entity::find()
            .filter(businesses::Column::Owner.eq(owner))
            .one(&self.db)
            .await?
            .map(business_from_model))
    }

    async fn business_find_page(
        &self,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<BusinessInfo>> {
        let total_count = businesses::Entity::find()
            .select_only()
            .column_as(Expr::col(Asterisk).count(), "count")
            .into_tuple::<i64>()
            .one(&self.db)
            .await?
            .unwrap_or_default() as u64;

        if total_count == 0 {
            return Ok(Page::empty());
        }

        let offset = Page::<()>::offset(page_no, page_size);
        let page_items = businesses::Entity::find()
            .order_by_desc(businesses::Column::GmtCreate)
            .offset(offset)
            .limit(page_size)
            .all(&self.db)
            .await?
            .into_iter()
            .map(business_from_model)
            .collect();

        Ok(Page::new(total_count, page_no, page_size, page_items))
    }
}

// ============================================================================
// ProductPersistence implementation
// ============================================================================

fn apply_product_filters(
    mut select: Select<products::Entity>,
    query: &ProductQuery,
) -> Select<products::Entity> {
    if let Some(city) = &query.city {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(products::Column::City))).eq(city.to_lowercase()),
        );
    }
    if let Some(category) = &query.category {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(products::Column::Category)))
                .eq(category.to_lowercase()),
        );
    }
    if let Some(min) = query.min_price {
        select = select.filter(products::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        select = select.filter(products::Column::Price.lte(max));
    }
    if let Some(guests) = query.guests {
        select = select.filter(products::Column::MaxGuests.gte(guests));
    }
    select
}

#[async_trait]
impl ProductPersistence for ExternalDbPersistService {
    async fn product_create(&self, product: &ProductInfo) -> anyhow::Result<()> {
        products::Entity::insert(product_to_active(product)?)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn product_find_by_id(&self, id: &str) -> anyhow::Result<Option<ProductInfo>> {
        Ok(products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(product_from_model))
    }

    async fn product_find_page(
        &self,
        query: &ProductQuery,
        page_no: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ProductInfo>> {
        let total_count = apply_product_filters(products::Entity::find(), query)
            .select_only()
            .column_as(Expr::col(Asterisk).count(), "count")
            .into_tuple::<i64>()
            .one(&self.db)
            .await?
            .unwrap_or_default() as u64;

        if total_count == 0 {
            return Ok(Page::empty());
        }

        let offset = Page::<()>::offset(page_no, page_size);
        let page_items = apply_product_filters(products::Entity::find(), query)
            .order_by_desc(products::Column::GmtCreate)
            .offset(offset)
            .limit(page_size)
            .all(&self.db)
            .await?
            .into_iter()
            .map(product_from_model)
            .collect();

        Ok(Page::new(total_count, page_no, page_size, page_items))
    }

    async fn product_find_by_business(
        &self,
        business_id: &str,
    ) -> anyhow::Result<Vec<ProductInfo>> {
        Ok(products::Entity::find()
            .filter(products::Column::BusinessId.eq(business_id))
            .order_by_desc(products::Column::GmtCreate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(product_from_model)
            .collect())
    }

    async fn product_update(&self, product: &ProductInfo) -> anyhow::Result<()> {
        let mut model = product_to_active(product)?;
        // Identity, ownership and aggregates are not editable
        model.business_id = NotSet;
        model.owner = NotSet;
        model.average_rating = NotSet;
        model.review_count = NotSet;
        model.gmt_create = NotSet;

        model.update(&self.db).await?;
        Ok(())
    }

    async fn product_delete_unless_booked(
        &self,
        id: &str,
        today: NaiveDate,
    ) -> anyhow::Result<bool> {
        let txn = self.db.begin().await?;

        if !lock_listing(&txn, id).await? {
            txn.rollback().await?;
            return Ok(true);
        }

        let upcoming = bookings::Entity::find()
            .filter(bookings::Column::ProductId.eq(id))
            .filter(bookings::Column::Status.ne(BookingStatus::Cancelled.as_str()))
            .filter(bookings::Column::CheckOut.gt(today))
            .one(&txn)
            .await?;
        if upcoming.is_some() {
            txn.rollback().await?;
            return Ok(false);
        }

        products::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }
}

// ============================================================================
// BookingPersistence implementation
// ============================================================================

#[async_trait]
impl BookingPersistence for ExternalDbPersistService {
    async fn booking_create_if_free(
        &self,
        booking: &BookingInfo,
    ) -> anyhow::Result<InsertOutcome> {
        let txn = self.db.begin().await?;

        // Row lock on the listing serializes concurrent writers across processes
        if !lock_listing(&txn, &booking.product_id).await? {
            txn.rollback().await?;
            return Ok(InsertOutcome::ListingMissing);
        }

        let taken = conflicts_query(&booking.product_id, &booking.stay())
            .one(&txn)
            .await?;
        if taken.is_some() {
            txn.rollback().await?;
            return Ok(InsertOutcome::Conflict);
        }

        let entity = bookings::ActiveModel {
            id: Set(booking.id.clone()),
            product_id: Set(booking.product_id.clone()),
            user_id: Set(booking.user_id.clone()),
            check_in: Set(booking.check_in),
            check_out: Set(booking.check_out),
            guests: Set(booking.guests),
            nights: Set(booking.nights),
            total_price: Set(booking.total_price),
            status: Set(booking.status.as_str().to_string()),
            gmt_create: Set(from_millis(booking.created_time)),
        };
        bookings::Entity::insert(entity)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(InsertOutcome::Created)
    }

    async fn booking_find_by_id(&self, id: &str) -> anyhow::Result<Option<BookingInfo>> {
        Ok(bookings::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(booking_from_model))
    }

    async fn booking_find_by_user(&self, user_id: &str) -> anyhow::Result<Vec<BookingInfo>> {
        Ok(bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .order_by_desc(bookings::Column::GmtCreate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(booking_from_model)
            .collect())
    }

    async fn booking_find_by_product(&self, product_id: &str) -> anyhow::Result<Vec<BookingInfo>> {
        Ok(bookings::Entity::find()
            .filter(bookings::Column::ProductId.eq(product_id))
            .order_by_asc(bookings::Column::CheckIn)
            .all(&self.db)
            .await?
            .into_iter()
            .map(booking_from_model)
            .collect())
    }

    async fn booking_update_status(&self, id: &str, status: BookingStatus) -> anyhow::Result<()> {
        let result = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, Expr::value(status.as_str()))
            .filter(bookings::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(anyhow::anyhow!("Booking not found: {}", id));
        }
        Ok(())
    }
}

// ============================================================================
// ReviewPersistence implementation
// ============================================================================

#[async_trait]
impl ReviewPersistence for ExternalDbPersistService {
    async fn review_create_if_absent(&self, review: &ReviewInfo) -> anyhow::Result<InsertOutcome> {
        let txn = self.db.begin().await?;

        if !lock_listing(&txn, &review.product_id).await? {
            txn.rollback().await?;
            return Ok(InsertOutcome::ListingMissing);
        }

        let entity = reviews::ActiveModel {
            id: Set(review.id.clone()),
            product_id: Set(review.product_id.clone()),
            user_id: Set(review.user_id.clone()),
            rating: Set(review.rating),
            comment: Set(review.comment.clone()),
            gmt_create: Set(from_millis(review.created_time)),
        };

        if let Err(e) = reviews::Entity::insert(entity)
            .exec_without_returning(&txn)
            .await
        {
            txn.rollback().await?;
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Ok(InsertOutcome::Conflict);
            }
            return Err(e.into());
        }

        refresh_rating(&txn, &review.product_id).await?;
        txn.commit().await?;
        Ok(InsertOutcome::Created)
    }

    async fn review_find_by_id(&self, id: &str) -> anyhow::Result<Option<ReviewInfo>> {
        Ok(reviews::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(review_from_model))
    }

    async fn review_find_by_product(&self, product_id: &str) -> anyhow::Result<Vec<ReviewInfo>> {
        Ok(reviews::Entity::find()
            .filter(reviews::Column::ProductId.eq(product_id))
            .order_by_desc(reviews::Column::GmtCreate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(review_from_model)
            .collect())
    }

    async fn review_delete(&self, id: &str) -> anyhow::Result<()> {
        let txn = self.db.begin().await?;

        let Some(review) = reviews::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(());
        };

        lock_listing(&txn, &review.product_id).await?;
        reviews::Entity::delete_by_id(id).exec(&txn).await?;
        refresh_rating(&txn, &review.product_id).await?;

        txn.commit().await?;
        Ok(())
    }
}
