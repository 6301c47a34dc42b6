use actix_web::{HttpResponse, get, web};

use crate::{
    error::AppError,
    model::{AppState, request::PageParam},
    service::user,
};

#[get("")]
async fn list(
    data: web::Data<AppState>,
    params: web::Query<PageParam>,
) -> Result<HttpResponse, AppError> {
    let (page_no, page_size) = data
        .configuration
        .page_bounds(params.page_no, params.page_size);

    let page = user::list_businesses(data.persistence(), page_no, page_size).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/owner/{owner_id}")]
async fn get_by_owner(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let business = user::get_business_by_owner(data.persistence(), &path).await?;
    Ok(HttpResponse::Ok().json(business))
}

#[get("/{id}")]
async fn get_business(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let business = user::get_business(data.persistence(), &path).await?;
    Ok(HttpResponse::Ok().json(business))
}
