use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::order_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/order", get(order_controller::get_my_orders))
        .route(
            "/api/order/checkout/create-checkout-session",
            post(order_controller::create_checkout_session),
        )
        .route("/api/order/checkout/webhook", post(order_controller::stripe_webhook_handler))
}
