use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppError,
    models::{CurrentUser, TokenSubject},
    services::user_service::{self, CreateUserRequest, UpdateUserRequest},
    AppState,
};

// GET /api/my/user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let view = user_service::get_current_user(&state, &user).await?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

// POST /api/my/user
pub async fn create_current_user(
    State(state): State<AppState>,
    Extension(TokenSubject(sub)): Extension<TokenSubject>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let (view, created) = user_service::create_current_user(&state, &sub, req).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(view)).into_response())
}

// PUT /api/my/user
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let view = user_service::update_current_user(&state, &user, req).await?;
    Ok((StatusCode::OK, Json(view)).into_response())
}
