use axum::Json;
use titanic_common::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
