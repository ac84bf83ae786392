use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use tokio::sync::RwLock;

use crate::models::{Order, OrderStatus, OrderWithRelations, Restaurant, User};

use super::store::{
    MarkPaid, OrderRepository, RestaurantPage, RestaurantRepository, RestaurantSearch, SortOption,
    Store, UserRepository, SEARCH_PAGE_SIZE,
};

/// In-process store used for `STORAGE_BACKEND=memory` and in tests.
#[derive(Default)]
pub struct MemoryStore {
    restaurants: RwLock<HashMap<ObjectId, Restaurant>>,
    orders: RwLock<HashMap<ObjectId, Order>>,
    users: RwLock<HashMap<ObjectId, User>>,
}

fn ci_regex(text: &str) -> Result<Regex, String> {
    Regex::new(&format!("(?i){}", regex::escape(text.trim()))).map_err(|e| e.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restaurants are managed outside this service; seeding is how they get in.
    pub async fn seed_restaurant(&self, restaurant: Restaurant) {
        self.restaurants.write().await.insert(restaurant.id, restaurant);
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn all_orders(&self) -> Vec<Order> {
        self.orders.read().await.values().cloned().collect()
    }
}

fn matches(search: &RestaurantSearch, r: &Restaurant) -> Result<bool, String> {
    if !ci_regex(&search.city)?.is_match(&r.city) {
        return Ok(false);
    }

    for cuisine in &search.cuisines {
        let re = ci_regex(cuisine)?;
        if !r.cuisines.iter().any(|c| re.is_match(c)) {
            return Ok(false);
        }
    }

    if let Some(q) = search.search_query.as_deref().filter(|q| !q.trim().is_empty()) {
        let re = ci_regex(q)?;
        if !re.is_match(&r.restaurant_name) && !r.cuisines.iter().any(|c| re.is_match(c)) {
            return Ok(false);
        }
    }

    Ok(true)
}

#[async_trait]
impl RestaurantRepository for MemoryStore {
    async fn find_restaurant(&self, id: ObjectId) -> Result<Option<Restaurant>, String> {
        Ok(self.restaurants.read().await.get(&id).cloned())
    }

    async fn search_restaurants(&self, search: &RestaurantSearch) -> Result<RestaurantPage, String> {
        let all = self.restaurants.read().await;

        let mut found: Vec<Restaurant> = vec![];
        for r in all.values() {
            if matches(search, r)? {
                found.push(r.clone());
            }
        }

        match search.sort {
            SortOption::LastUpdated => found.sort_by_key(|r| r.last_updated),
            SortOption::DeliveryPrice => found.sort_by_key(|r| r.delivery_price),
            SortOption::EstimatedDeliveryTime => found.sort_by_key(|r| r.estimated_delivery_time),
        }

        let total = found.len() as u64;
        let data = found
            .into_iter()
            .skip(search.skip() as usize)
            .take(SEARCH_PAGE_SIZE as usize)
            .collect();

        Ok(RestaurantPage { data, total })
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<(), String> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(format!("duplicate order id {}", order.id.to_hex()));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_order(&self, id: ObjectId) -> Result<Option<Order>, String> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn mark_order_paid(&self, id: ObjectId, total_amount: i64) -> Result<MarkPaid, String> {
        let mut orders = self.orders.write().await;

        let Some(order) = orders.get_mut(&id) else {
            return Ok(MarkPaid::NotFound);
        };

        if order.status != OrderStatus::PendingPayment {
            return Ok(MarkPaid::AlreadyPaid);
        }

        order.status = OrderStatus::Paid;
        order.total_amount = Some(total_amount);
        Ok(MarkPaid::Updated)
    }

    async fn list_orders_for_user(&self, user_id: ObjectId) -> Result<Vec<OrderWithRelations>, String> {
        let mut mine: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let restaurants = self.restaurants.read().await;
        let user = self.users.read().await.get(&user_id).cloned();

        Ok(mine
            .into_iter()
            .map(|order| OrderWithRelations {
                restaurant: restaurants.get(&order.restaurant).cloned(),
                user: user.clone(),
                order,
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, String> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, String> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.auth0_id == auth0_id)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), String> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.auth0_id == user.auth0_id) {
            return Err(format!("duplicate auth0Id {}", user.auth0_id));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), String> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(format!("user {} not found", user.id.to_hex())),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), String> {
        Ok(())
    }
}
