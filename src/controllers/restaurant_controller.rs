use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppError,
    services::restaurant_service::{self, RestaurantView, SearchParams, SearchResponse},
    AppState,
};

// GET /api/restaurant/:restaurant_id
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<RestaurantView>, AppError> {
    let restaurant = restaurant_service::get_restaurant(&state, &restaurant_id).await?;
    Ok(Json(restaurant))
}

// GET /api/restaurant/search/:city
pub async fn search_restaurants(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let res = restaurant_service::search_restaurants(&state, &city, &params).await?;
    Ok(Json(res))
}
