use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{error::AppError, AppState};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(_) => (StatusCode::OK, "db: ok".to_string()).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("db error: {}", e),
        )
            .into_response(),
    }
}

pub async fn not_found() -> impl IntoResponse {
    AppError::NotFound("Not found".into())
}
