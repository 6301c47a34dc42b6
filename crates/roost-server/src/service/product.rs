//! Listing management

use chrono::NaiveDate;
use tracing::info;

use roost_auth::AuthContext;
use roost_common::{
    RoostError,
    error::{BUSINESS_NOT_FOUND, LISTING_NOT_FOUND, USER_NOT_FOUND},
};
use roost_persistence::{Page, PersistenceService, ProductInfo, ProductQuery};

use crate::model::request::{CreateProductRequest, UpdateProductRequest};

/// Publish a listing under the caller's business.
///
/// The role is read from storage rather than the token so that a user who
/// just registered a business can publish without logging in again.
pub async fn create(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    req: CreateProductRequest,
) -> anyhow::Result<ProductInfo> {
    let user = persistence
        .user_find_by_id(&ctx.user_id)
        .await?
        .ok_or_else(|| RoostError::unauthorized(USER_NOT_FOUND))?;

    if !user.role.can_host() {
        return Err(RoostError::forbidden("only business accounts can create listings").into());
    }

    let business = persistence
        .business_find_by_owner(&user.id)
        .await?
        .ok_or_else(|| RoostError::bad_request("register a business before publishing listings"))?;

    let now = chrono::Utc::now().timestamp_millis();
    let product = ProductInfo {
        id: uuid::Uuid::new_v4().to_string(),
        business_id: business.id,
        owner: user.id,
        title: req.title.trim().to_string(),
        description: req.description,
        category: req.category.trim().to_lowercase(),
        location: req.location.into(),
        price: req.price,
        max_guests: req.max_guests,
        bedrooms: req.bedrooms,
        beds: req.beds,
        bathrooms: req.bathrooms,
        amenities: req.amenities,
        images: req.images,
        average_rating: 0.0,
        review_count: 0,
        created_time: now,
        modified_time: now,
    };

    persistence.product_create(&product).await?;

    info!(product_id = %product.id, business_id = %product.business_id, "Listing created");
    Ok(product)
}

pub async fn get(persistence: &dyn PersistenceService, id: &str) -> anyhow::Result<ProductInfo> {
    persistence
        .product_find_by_id(id)
        .await?
        .ok_or_else(|| RoostError::not_found(LISTING_NOT_FOUND).into())
}

pub async fn search(
    persistence: &dyn PersistenceService,
    query: &ProductQuery,
    page_no: u64,
    page_size: u64,
) -> anyhow::Result<Page<ProductInfo>> {
    persistence.product_find_page(query, page_no, page_size).await
}

pub async fn list_by_business(
    persistence: &dyn PersistenceService,
    business_id: &str,
) -> anyhow::Result<Vec<ProductInfo>> {
    if persistence.business_find_by_id(business_id).await?.is_none() {
        return Err(RoostError::not_found(BUSINESS_NOT_FOUND).into());
    }
    persistence.product_find_by_business(business_id).await
}

async fn find_owned(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
) -> anyhow::Result<ProductInfo> {
    let product = get(persistence, id).await?;
    if !ctx.is_self_or_admin(&product.owner) {
        return Err(RoostError::forbidden("only the owner can modify this listing").into());
    }
    Ok(product)
}

/// Apply the fields present in `req`
pub async fn update(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
    req: UpdateProductRequest,
) -> anyhow::Result<ProductInfo> {
    let mut product = find_owned(persistence, ctx, id).await?;

    if let Some(title) = req.title {
        product.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        product.description = description;
    }
    if let Some(category) = req.category {
        product.category = category.trim().to_lowercase();
    }
    if let Some(location) = req.location {
        product.location = location.into();
    }
    if let Some(price) = req.price {
        product.price = price;
    }
    if let Some(max_guests) = req.max_guests {
        product.max_guests = max_guests;
    }
    if let Some(bedrooms) = req.bedrooms {
        product.bedrooms = bedrooms;
    }
    if let Some(beds) = req.beds {
        product.beds = beds;
    }
    if let Some(bathrooms) = req.bathrooms {
        product.bathrooms = bathrooms;
    }
    if let Some(amenities) = req.amenities {
        product.amenities = amenities;
    }
    if let Some(images) = req.images {
        product.images = images;
    }
    product.modified_time = chrono::Utc::now().timestamp_millis();

    persistence.product_update(&product).await?;

    info!(product_id = %product.id, "Listing updated");
    Ok(product)
}

pub async fn delete(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
) -> anyhow::Result<()> {
    delete_on(persistence, ctx, id, super::today()).await
}

/// Listings with upcoming stays cannot be removed
pub async fn delete_on(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let product = find_owned(persistence, ctx, id).await?;

    if !persistence
        .product_delete_unless_booked(&product.id, today)
        .await?
    {
        return Err(RoostError::bad_request("listing has upcoming bookings").into());
    }

    info!(product_id = %product.id, "Listing deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_common::UserRole;
    use roost_persistence::{
        BusinessInfo, BusinessPersistence, MemoryPersistService, UserInfo, UserPersistence,
    };

    use crate::model::request::LocationRequest;

    fn ctx(user_id: &str, role: UserRole) -> AuthContext {
        AuthContext {
            user_id: user_id.to_string(),
            role,
            jwt_error: None,
            token_provided: true,
        }
    }

    fn user(id: &str, role: UserRole) -> UserInfo {
        UserInfo {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{}@example.com", id),
            password: String::new(),
            role,
            phone: None,
            avatar: None,
            created_time: 0,
            modified_time: 0,
        }
    }

    fn request() -> CreateProductRequest {
        CreateProductRequest {
            title: "Sea view loft".to_string(),
            description: String::new(),
            category: " Apartment ".to_string(),
            location: LocationRequest {
                address: "1 Rua Augusta".to_string(),
                city: "Lisbon".to_string(),
                country: "PT".to_string(),
                lat: None,
                lng: None,
            },
            price: 120.0,
            max_guests: 3,
            bedrooms: 1,
            beds: 2,
            bathrooms: 1,
            amenities: vec!["wifi".to_string()],
            images: vec![],
        }
    }

    async fn store_with_host() -> MemoryPersistService {
        let store = MemoryPersistService::new();
        store.user_create(&user("host", UserRole::Business)).await.unwrap();
        store.user_create(&user("guest", UserRole::User)).await.unwrap();
        store
            .business_create(&BusinessInfo {
                id: "b1".to_string(),
                owner: "host".to_string(),
                name: "Casa".to_string(),
                description: String::new(),
                phone: "123".to_string(),
                email: "casa@example.com".to_string(),
                address: "Lisbon".to_string(),
                created_time: 0,
            })
            .await
            .unwrap();
        store
    }

    fn status_of(err: &anyhow::Error) -> u16 {
        err.downcast_ref::<RoostError>().unwrap().status_code()
    }

    #[tokio::test]
    async fn test_create_requires_business_role() {
        let store = store_with_host().await;

        let err = create(&store, &ctx("guest", UserRole::User), request())
            .await
            .unwrap_err();
        assert_eq!(status_of(&err), 403);

        let product = create(&store, &ctx("host", UserRole::Business), request())
            .await
            .unwrap();
        assert_eq!(product.business_id, "b1");
        assert_eq!(product.category, "apartment");
        assert_eq!(list_by_business(&store, "b1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_owner_only() {
        let store = store_with_host().await;
        let host = ctx("host", UserRole::Business);
        let product = create(&store, &host, request()).await.unwrap();

        let patch = UpdateProductRequest {
            price: Some(99.5),
            ..Default::default()
        };
        let err = update(&store, &ctx("guest", UserRole::User), &product.id, patch.clone())
            .await
            .unwrap_err();
        assert_eq!(status_of(&err), 403);

        let updated = update(&store, &host, &product.id, patch).await.unwrap();
        assert_eq!(updated.price, 99.5);
        assert_eq!(updated.title, "Sea view loft");

        delete(&store, &host, &product.id).await.unwrap();
        let err = get(&store, &product.id).await.unwrap_err();
        assert_eq!(status_of(&err), 404);
    }
}
