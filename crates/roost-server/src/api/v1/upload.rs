use actix_web::{HttpRequest, HttpResponse, post, web};
use validator::Validate;

use crate::{
    error::AppError,
    model::{AppState, request::PresignedUrlRequest},
    secured::require_auth,
    service::upload,
};

/// Presigned S3 PUT URL for a listing image
#[post("/presigned-url")]
async fn presigned_url(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<PresignedUrlRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = require_auth(&req)?;
    body.validate()?;

    let presigned = upload::presign_image_upload(
        data.upload_signer.as_ref(),
        &data.configuration,
        &ctx.user_id,
        &body.file_name,
        &body.file_type,
    )
    .await?;

    Ok(HttpResponse::Ok().json(presigned))
}
