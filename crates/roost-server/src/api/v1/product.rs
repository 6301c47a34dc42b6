use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use validator::Validate;

use crate::{
    error::AppError,
    model::{
        AppState,
        request::{CreateProductRequest, ProductSearchParam, UpdateProductRequest},
        response::MessageResult,
    },
    secured::require_auth,
    service::product,
};

#[post("")]
async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    body.validate()?;

    let created = product::create(data.persistence(), &ctx, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

async fn search(
    data: web::Data<AppState>,
    params: web::Query<ProductSearchParam>,
) -> Result<HttpResponse, AppError> {
    let (page_no, page_size) = data
        .configuration
        .page_bounds(params.page_no, params.page_size);

    let page = product::search(data.persistence(), &params.query(), page_no, page_size).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("")]
async fn list(
    data: web::Data<AppState>,
    params: web::Query<ProductSearchParam>,
) -> Result<HttpResponse, AppError> {
    search(data, params).await
}

#[get("/get-all-product")]
async fn get_all(
    data: web::Data<AppState>,
    params: web::Query<ProductSearchParam>,
) -> Result<HttpResponse, AppError> {
    search(data, params).await
}

#[get("/get-product/{id}")]
async fn get_product(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let found = product::get(data.persistence(), &path).await?;
    Ok(HttpResponse::Ok().json(found))
}

#[get("/business/{business_id}")]
async fn list_by_business(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let products = product::list_by_business(data.persistence(), &path).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[get("/{id}/availability")]
async fn availability(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let booked = data.booking_service.availability(&path).await?;
    Ok(HttpResponse::Ok().json(booked))
}

#[patch("/{id}")]
async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    body.validate()?;

    let updated = product::update(data.persistence(), &ctx, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{id}")]
async fn delete(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    product::delete(data.persistence(), &ctx, &path).await?;
    Ok(MessageResult::http_ok("listing deleted"))
}
