use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::CurrentUser,
    services::{
        checkout_service::{self, CheckoutSessionRequest},
        order_service, payment_service,
        stripe_webhook::SIGNATURE_HEADER,
    },
    AppState,
};

// GET /api/order
pub async fn get_my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let orders = order_service::list_my_orders(&state, user.id).await?;
    Ok((StatusCode::OK, Json(orders)).into_response())
}

// POST /api/order/checkout/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CheckoutSessionRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let url = checkout_service::create_checkout_session(&state, &user, req).await?;
    Ok((StatusCode::OK, Json(json!({ "url": url }))).into_response())
}

// POST /api/order/checkout/webhook
//
// Raw body on purpose: the signature covers the exact bytes received.
pub async fn stripe_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    payment_service::handle_webhook(&state, &body, signature).await?;
    Ok(StatusCode::OK.into_response())
}
