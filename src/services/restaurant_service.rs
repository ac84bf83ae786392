use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{MenuItem, Restaurant},
    AppState,
};

use super::store::{RestaurantSearch, SortOption, MAX_SEARCH_PAGE, SEARCH_PAGE_SIZE};

pub(crate) fn fmt_date(d: &DateTime) -> String {
    d.try_to_rfc3339_string()
        .unwrap_or_else(|_| d.timestamp_millis().to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItemView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub restaurant_name: String,
    pub city: String,
    pub country: String,
    pub delivery_price: i64,
    pub estimated_delivery_time: i64,
    pub cuisines: Vec<String>,
    pub menu_items: Vec<MenuItemView>,
    pub image_url: String,
    pub last_updated: String,
}

impl From<&MenuItem> for MenuItemView {
    fn from(m: &MenuItem) -> Self {
        Self {
            id: m.id.to_hex(),
            name: m.name.clone(),
            price: m.price,
        }
    }
}

impl From<Restaurant> for RestaurantView {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id.to_hex(),
            user: r.user.to_hex(),
            menu_items: r.menu_items.iter().map(MenuItemView::from).collect(),
            last_updated: fmt_date(&r.last_updated),
            restaurant_name: r.restaurant_name,
            city: r.city,
            country: r.country,
            delivery_price: r.delivery_price,
            estimated_delivery_time: r.estimated_delivery_time,
            cuisines: r.cuisines,
            image_url: r.image_url,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub selected_cuisines: Option<String>,
    #[serde(default)]
    pub sort_option: Option<String>,
    // kept as text: anything unparsable means page 1
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub data: Vec<RestaurantView>,
    pub pagination: Pagination,
}

pub fn build_search(city: &str, params: &SearchParams) -> RestaurantSearch {
    let cuisines = params
        .selected_cuisines
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let page = params
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<u64>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SEARCH_PAGE);

    RestaurantSearch {
        city: city.trim().to_string(),
        search_query: params
            .search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
        cuisines,
        sort: SortOption::parse(params.sort_option.as_deref()),
        page,
    }
}

pub async fn get_restaurant(state: &AppState, restaurant_id: &str) -> Result<RestaurantView, AppError> {
    let not_found = || AppError::NotFound("Restaurant not found".into());

    let id = ObjectId::parse_str(restaurant_id.trim()).map_err(|_| not_found())?;

    state
        .store
        .find_restaurant(id)
        .await
        .map_err(AppError::Internal)?
        .map(RestaurantView::from)
        .ok_or_else(not_found)
}

pub async fn search_restaurants(
    state: &AppState,
    city: &str,
    params: &SearchParams,
) -> Result<SearchResponse, AppError> {
    if city.trim().is_empty() {
        return Err(AppError::Validation("city is required".into()));
    }

    let search = build_search(city, params);
    let page = state
        .store
        .search_restaurants(&search)
        .await
        .map_err(AppError::Internal)?;

    Ok(SearchResponse {
        data: page.data.into_iter().map(RestaurantView::from).collect(),
        pagination: Pagination {
            total: page.total,
            page: search.page,
            pages: page.total.div_ceil(SEARCH_PAGE_SIZE),
        },
    })
}
