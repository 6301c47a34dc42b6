//! V1 API routing configuration
//!
//! Routes (relative to the context path, `/api/v1` by default):
//! - POST /auth/register, /auth/login, /auth/logout
//! - GET /user/me, GET|PATCH /user/{id}, PATCH /user/{id}/register-business
//! - GET /business, /business/{id}, /business/owner/{ownerId}
//! - POST|GET /product, GET /product/get-all-product, /product/get-product/{id},
//!   /product/business/{businessId}, /product/{id}/availability,
//!   PATCH|DELETE /product/{id}
//! - POST /bookings/create, GET /bookings, /bookings/{id}, /bookings/product/{productId},
//!   DELETE /bookings/{id}
//! - POST /reviews, GET /reviews/product/{productId}, DELETE /reviews/{id}
//! - POST /s3/presigned-url
//! - GET /health/liveness, /health/readiness

use actix_web::{
    HttpRequest,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web,
};

use roost_common::RoostError;

use crate::error::AppError;

use super::{auth, booking, business, health, product, review, upload, user};

fn bad_request(message: String) -> actix_web::Error {
    AppError::from(RoostError::bad_request(message)).into()
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(format!("invalid request body: {}", err))
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(format!("invalid query string: {}", err))
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(format!("invalid path: {}", err))
}

/// Register extractor error handlers and every V1 scope
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::logout),
        )
        .service(
            web::scope("/user")
                .service(user::me)
                .service(user::get_user)
                .service(user::update_user)
                .service(user::register_business),
        )
        .service(
            web::scope("/business")
                .service(business::list)
                .service(business::get_by_owner)
                .service(business::get_business),
        )
        .service(
            web::scope("/product")
                .service(product::create)
                .service(product::list)
                .service(product::get_all)
                .service(product::get_product)
                .service(product::list_by_business)
                .service(product::availability)
                .service(product::update)
                .service(product::delete),
        )
        .service(
            web::scope("/bookings")
                .service(booking::create)
                .service(booking::list_mine)
                .service(booking::list_for_product)
                .service(booking::get_booking)
                .service(booking::cancel),
        )
        .service(
            web::scope("/reviews")
                .service(review::create)
                .service(review::list_for_product)
                .service(review::delete),
        )
        .service(web::scope("/s3").service(upload::presigned_url))
        .service(
            web::scope("/health")
                .service(health::liveness)
                .service(health::readiness),
        );
}
