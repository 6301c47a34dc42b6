use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use validator::Validate;

use crate::{
    error::AppError,
    model::{AppState, request::CreateReviewRequest, response::MessageResult},
    secured::require_auth,
    service::review,
};

#[post("")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    body.validate()?;

    let created = review::create(data.persistence(), &ctx, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[get("/product/{product_id}")]
async fn list_for_product(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let reviews = review::list_for_product(data.persistence(), &path).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

#[delete("/{id}")]
async fn delete(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    review::delete(data.persistence(), &ctx, &path).await?;
    Ok(MessageResult::http_ok("review deleted"))
}
