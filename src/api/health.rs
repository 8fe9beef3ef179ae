use crate::api::dto::health::HealthResponse;
use axum::Json;
use time::OffsetDateTime;

/// Liveness probe: reports that the process is up. No dependency is checked.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK".to_string(), timestamp: OffsetDateTime::now_utc() })
}
