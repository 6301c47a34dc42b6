//! Reviews and listing ratings

use tracing::info;

use roost_auth::AuthContext;
use roost_common::{
    RoostError,
    error::{LISTING_NOT_FOUND, REVIEW_NOT_FOUND},
};
use roost_persistence::{InsertOutcome, PersistenceService, ReviewInfo};

use crate::model::request::CreateReviewRequest;

pub async fn create(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    req: CreateReviewRequest,
) -> anyhow::Result<ReviewInfo> {
    let review = ReviewInfo {
        id: uuid::Uuid::new_v4().to_string(),
        product_id: req.product_id,
        user_id: ctx.user_id.clone(),
        rating: req.rating,
        comment: req.comment.trim().to_string(),
        created_time: chrono::Utc::now().timestamp_millis(),
    };

    match persistence.review_create_if_absent(&review).await? {
        InsertOutcome::Created => {}
        InsertOutcome::Conflict => {
            return Err(RoostError::bad_request("listing already reviewed").into());
        }
        InsertOutcome::ListingMissing => {
            return Err(RoostError::not_found(LISTING_NOT_FOUND).into());
        }
    }

    info!(product_id = %review.product_id, review_id = %review.id, "Review created");
    Ok(review)
}

pub async fn list_for_product(
    persistence: &dyn PersistenceService,
    product_id: &str,
) -> anyhow::Result<Vec<ReviewInfo>> {
    if persistence.product_find_by_id(product_id).await?.is_none() {
        return Err(RoostError::not_found(LISTING_NOT_FOUND).into());
    }
    persistence.review_find_by_product(product_id).await
}

pub async fn delete(
    persistence: &dyn PersistenceService,
    ctx: &AuthContext,
    id: &str,
) -> anyhow::Result<()> {
    let review = persistence
        .review_find_by_id(id)
        .await?
        .ok_or_else(|| RoostError::not_found(REVIEW_NOT_FOUND))?;

    if !ctx.is_self_or_admin(&review.user_id) {
        return Err(RoostError::forbidden("only the author can delete this review").into());
    }

    persistence.review_delete(&review.id).await?;

    info!(product_id = %review.product_id, review_id = %review.id, "Review deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_common::UserRole;
    use roost_persistence::{Location, MemoryPersistService, ProductInfo, ProductPersistence};

    fn ctx(user_id: &str) -> AuthContext {
        AuthContext {
            user_id: user_id.to_string(),
            role: UserRole::User,
            jwt_error: None,
            token_provided: true,
        }
    }

    fn review(rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            product_id: "p1".to_string(),
            rating,
            comment: "Lovely stay".to_string(),
        }
    }

    async fn store() -> MemoryPersistService {
        let store = MemoryPersistService::new();
        store
            .product_create(&ProductInfo {
                id: "p1".to_string(),
                business_id: "b1".to_string(),
                owner: "host".to_string(),
                title: "Cabin".to_string(),
                description: String::new(),
                category: "cabin".to_string(),
                location: Location::default(),
                price: 80.0,
                max_guests: 2,
                bedrooms: 1,
                beds: 1,
                bathrooms: 1,
                amenities: vec![],
                images: vec![],
                average_rating: 0.0,
                review_count: 0,
                created_time: 0,
                modified_time: 0,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_rating_recomputed() {
        let store = store().await;
        create(&store, &ctx("a"), review(5)).await.unwrap();
        create(&store, &ctx("b"), review(4)).await.unwrap();
        let third = create(&store, &ctx("c"), review(4)).await.unwrap();

        let product = store.product_find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.review_count, 3);
        assert_eq!(product.average_rating, 4.33);

        delete(&store, &ctx("c"), &third.id).await.unwrap();
        let product = store.product_find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.review_count, 2);
        assert_eq!(product.average_rating, 4.5);
    }

    #[tokio::test]
    async fn test_one_review_per_user() {
        let store = store().await;
        create(&store, &ctx("a"), review(5)).await.unwrap();

        let err = create(&store, &ctx("a"), review(1)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<RoostError>().unwrap().status_code(), 400);
    }

    #[tokio::test]
    async fn test_concurrent_reviews_by_same_user() {
        let store = store().await;
        let author = ctx("a");

        let results =
            futures::future::join_all((0..8).map(|_| create(&store, &author, review(5)))).await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let product = store.product_find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.review_count, 1);
    }

    #[tokio::test]
    async fn test_review_missing_listing() {
        let store = store().await;
        let req = CreateReviewRequest {
            product_id: "missing".to_string(),
            ..review(5)
        };

        let err = create(&store, &ctx("a"), req).await.unwrap_err();
        assert_eq!(err.downcast_ref::<RoostError>().unwrap().status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_by_stranger_forbidden() {
        let store = store().await;
        let mine = create(&store, &ctx("a"), review(3)).await.unwrap();

        let err = delete(&store, &ctx("b"), &mine.id).await.unwrap_err();
        assert_eq!(err.downcast_ref::<RoostError>().unwrap().status_code(), 403);
    }
}
