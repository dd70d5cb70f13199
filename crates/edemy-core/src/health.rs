use axum::http::StatusCode;

/// `GET /healthz`: process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
