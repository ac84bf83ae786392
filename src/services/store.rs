//! Storage seams.
//!
//! Controllers and services only talk to these traits. `MongoStore` backs them
//! with the database, `MemoryStore` keeps everything in process (local runs and
//! tests).

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Order, OrderWithRelations, Restaurant, User};

pub const SEARCH_PAGE_SIZE: u64 = 10;

/// Highest page whose skip still fits the database's signed 64-bit skip.
pub const MAX_SEARCH_PAGE: u64 = i64::MAX as u64 / SEARCH_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    LastUpdated,
    DeliveryPrice,
    EstimatedDeliveryTime,
}

impl SortOption {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("deliveryPrice") => SortOption::DeliveryPrice,
            Some("estimatedDeliveryTime") => SortOption::EstimatedDeliveryTime,
            _ => SortOption::LastUpdated,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            SortOption::LastUpdated => "lastUpdated",
            SortOption::DeliveryPrice => "deliveryPrice",
            SortOption::EstimatedDeliveryTime => "estimatedDeliveryTime",
        }
    }
}

/// Restaurant search criteria. All text matching is case-insensitive
/// substring matching on literal text.
#[derive(Debug, Clone, Default)]
pub struct RestaurantSearch {
    pub city: String,
    pub search_query: Option<String>,
    pub cuisines: Vec<String>,
    pub sort: SortOption,
    pub page: u64,
}

impl RestaurantSearch {
    pub fn skip(&self) -> u64 {
        (self.page.max(1) - 1)
            .saturating_mul(SEARCH_PAGE_SIZE)
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Clone)]
pub struct RestaurantPage {
    pub data: Vec<Restaurant>,
    pub total: u64,
}

/// Result of the pending -> paid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPaid {
    Updated,
    AlreadyPaid,
    NotFound,
}

#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn find_restaurant(&self, id: ObjectId) -> Result<Option<Restaurant>, String>;

    async fn search_restaurants(&self, search: &RestaurantSearch) -> Result<RestaurantPage, String>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<(), String>;

    async fn find_order(&self, id: ObjectId) -> Result<Option<Order>, String>;

    /// Moves a pending order to paid and records the settled amount. Orders
    /// that are already paid are left untouched.
    async fn mark_order_paid(&self, id: ObjectId, total_amount: i64) -> Result<MarkPaid, String>;

    /// Orders owned by `user_id`, newest first, with restaurant and user expanded.
    async fn list_orders_for_user(&self, user_id: ObjectId) -> Result<Vec<OrderWithRelations>, String>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, String>;

    async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, String>;

    async fn insert_user(&self, user: &User) -> Result<(), String>;

    async fn update_user(&self, user: &User) -> Result<(), String>;
}

#[async_trait]
pub trait Store: RestaurantRepository + OrderRepository + UserRepository {
    async fn ping(&self) -> Result<(), String>;
}
