use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::{error::AppError, AppState};

use super::store::MarkPaid;
use super::stripe_webhook::{self, CHECKOUT_SESSION_COMPLETED};

/// What a verified webhook delivery did. Every variant is acknowledged with
/// 200 so the processor stops redelivering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event kind this service does not act on.
    Ignored(String),
    MissingOrderId,
    OrderNotFound(String),
    AlreadyPaid(ObjectId),
    Paid { order_id: ObjectId, total_amount: i64 },
}

pub async fn handle_webhook(
    state: &AppState,
    payload: &[u8],
    signature: Option<&str>,
) -> Result<WebhookOutcome, AppError> {
    let event = stripe_webhook::construct_event(
        payload,
        signature,
        &state.settings.stripe_webhook_secret,
        state.settings.stripe_webhook_tolerance_secs,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "rejected webhook");
        AppError::InvalidSignature(e.to_string())
    })?;

    if event.kind != CHECKOUT_SESSION_COMPLETED {
        tracing::debug!(event_id = %event.id, kind = %event.kind, "ignoring webhook event");
        return Ok(WebhookOutcome::Ignored(event.kind));
    }

    let session = match event.completed_session() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(event_id = %event.id, error = %e, "unreadable checkout session in event");
            return Ok(WebhookOutcome::MissingOrderId);
        }
    };

    let Some(raw_order_id) = session.order_id() else {
        tracing::warn!(event_id = %event.id, session_id = %session.id, "checkout.session.completed without metadata.orderId");
        return Ok(WebhookOutcome::MissingOrderId);
    };

    let Ok(order_id) = ObjectId::parse_str(raw_order_id) else {
        tracing::warn!(event_id = %event.id, order_id = %raw_order_id, "order id in metadata is not an id");
        return Ok(WebhookOutcome::OrderNotFound(raw_order_id.to_string()));
    };

    let total_amount = session.amount_total.unwrap_or(0);

    match state
        .store
        .mark_order_paid(order_id, total_amount)
        .await
        .map_err(AppError::Internal)?
    {
        MarkPaid::Updated => {
            tracing::info!(%order_id, total_amount, "order updated to paid");
            Ok(WebhookOutcome::Paid { order_id, total_amount })
        }
        MarkPaid::AlreadyPaid => {
            tracing::warn!(%order_id, event_id = %event.id, "order already paid, event not applied");
            Ok(WebhookOutcome::AlreadyPaid(order_id))
        }
        MarkPaid::NotFound => {
            tracing::warn!(%order_id, "order not found yet");
            Ok(WebhookOutcome::OrderNotFound(raw_order_id.to_string()))
        }
    }
}
