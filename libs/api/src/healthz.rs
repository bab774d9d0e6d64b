use axum::http::StatusCode;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "The service is up")
    )
)]
pub async fn get_health() -> StatusCode {
    StatusCode::OK
}
