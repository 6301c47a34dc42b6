use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;

use crate::model::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[get("/liveness")]
async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "UP" }))
}

#[get("/readiness")]
async fn readiness(data: web::Data<AppState>) -> impl Responder {
    let storage = data.persistence().storage_mode().to_string();

    match data.persistence().health_check().await {
        Ok(()) => HttpResponse::Ok().json(HealthStatus {
            status: "UP".to_string(),
            storage,
            message: None,
        }),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthStatus {
                status: "DOWN".to_string(),
                storage,
                message: Some(e.to_string()),
            })
        }
    }
}
