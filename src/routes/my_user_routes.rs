use axum::{Router, routing::get};
use crate::{AppState, controllers::my_user_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/api/my/user",
        get(my_user_controller::get_current_user)
            .post(my_user_controller::create_current_user)
            .put(my_user_controller::update_current_user),
    )
}
