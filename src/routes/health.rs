use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::models::health::HealthResponse;
use crate::state::AppState;

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        storage: state.accounts.storage_backend().to_string(),
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
