use axum::Router;
use axum::middleware::from_fn_with_state;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod my_user_routes;
pub mod order_routes;
pub mod restaurant_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = my_user_routes::add_routes(router);
    let router = restaurant_routes::add_routes(router);
    let router = order_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .layer(from_fn_with_state(state.clone(), crate::auth::require_auth))
        .layer(from_fn_with_state(state.clone(), crate::auth::inject_current_user))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
