use actix_web::{HttpRequest, HttpResponse, get, patch, web};
use validator::Validate;

use crate::{
    error::AppError,
    model::{
        AppState,
        request::{RegisterBusinessRequest, UpdateProfileRequest},
    },
    secured::require_auth,
    service::user,
};

#[get("/me")]
async fn me(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    let user = user::get(data.persistence(), &ctx, &ctx.user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/{id}")]
async fn get_user(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    let user = user::get(data.persistence(), &ctx, &path).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[patch("/{id}")]
async fn update_user(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    body.validate()?;

    let user = user::update_profile(data.persistence(), &ctx, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[patch("/{id}/register-business")]
async fn register_business(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<RegisterBusinessRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    body.validate()?;

    let business =
        user::register_business(data.persistence(), &ctx, &path, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(business))
}
