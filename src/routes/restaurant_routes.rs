use axum::{Router, routing::get};

use crate::{AppState, controllers::restaurant_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/restaurant/search/:city", get(restaurant_controller::search_restaurants))
        .route("/api/restaurant/:restaurant_id", get(restaurant_controller::get_restaurant))
}
