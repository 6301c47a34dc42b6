use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use validator::Validate;

use crate::{
    error::AppError,
    model::{AppState, request::CreateBookingRequest},
    secured::require_auth,
    service::booking::NewBooking,
};

#[post("/create")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    body.validate()?;
    let body = body.into_inner();

    let booking = data
        .booking_service
        .create(
            &ctx.user_id,
            NewBooking {
                product_id: body.product_id,
                check_in: body.check_in,
                check_out: body.check_out,
                guests: body.guests,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(booking))
}

#[get("")]
async fn list_mine(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    let bookings = data.booking_service.list_for_user(&ctx.user_id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

#[get("/product/{product_id}")]
async fn list_for_product(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    let bookings = data.booking_service.list_for_product(&ctx, &path).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

#[get("/{id}")]
async fn get_booking(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    let booking = data.booking_service.get(&ctx, &path).await?;
    Ok(HttpResponse::Ok().json(booking))
}

#[delete("/{id}")]
async fn cancel(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    let booking = data.booking_service.cancel(&ctx, &path).await?;
    Ok(HttpResponse::Ok().json(booking))
}
