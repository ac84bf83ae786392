use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document, Regex};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection, Database};

use crate::models::{Order, OrderStatus, OrderWithRelations, Restaurant, User};

use super::db_init;
use super::store::{
    MarkPaid, OrderRepository, RestaurantPage, RestaurantRepository, RestaurantSearch, Store,
    UserRepository, SEARCH_PAGE_SIZE,
};

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

fn ci_regex(text: &str) -> Regex {
    Regex {
        pattern: regex::escape(text.trim()),
        options: "i".to_string(),
    }
}

/// Translate search criteria into a restaurants filter document.
pub fn search_filter(search: &RestaurantSearch) -> Document {
    let mut filter = doc! { "city": ci_regex(&search.city) };

    if !search.cuisines.is_empty() {
        let cuisines: Vec<Regex> = search.cuisines.iter().map(|c| ci_regex(c)).collect();
        filter.insert("cuisines", doc! { "$all": cuisines });
    }

    if let Some(q) = search.search_query.as_deref().filter(|q| !q.trim().is_empty()) {
        let re = ci_regex(q);
        filter.insert(
            "$or",
            vec![
                doc! { "restaurantName": re.clone() },
                doc! { "cuisines": { "$in": [re] } },
            ],
        );
    }

    filter
}

/// Matches the order only while it is still awaiting payment.
pub fn pending_order_filter(id: ObjectId) -> Document {
    doc! { "_id": id, "status": OrderStatus::PendingPayment.as_str() }
}

pub fn mark_paid_update(total_amount: i64) -> Document {
    doc! {
        "$set": {
            "status": OrderStatus::Paid.as_str(),
            "totalAmount": total_amount,
        }
    }
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, String> {
        let client = Client::with_uri_str(uri).await.map_err(|e| e.to_string())?;
        let db = client.database(db_name);

        db_init::ensure_indexes(&db).await?;

        Ok(Self::new(db))
    }

    fn restaurants(&self) -> Collection<Restaurant> {
        self.db.collection::<Restaurant>("restaurants")
    }

    fn orders(&self) -> Collection<Order> {
        self.db.collection::<Order>("orders")
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>("users")
    }
}

#[async_trait]
impl RestaurantRepository for MongoStore {
    async fn find_restaurant(&self, id: ObjectId) -> Result<Option<Restaurant>, String> {
        self.restaurants()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| e.to_string())
    }

    async fn search_restaurants(&self, search: &RestaurantSearch) -> Result<RestaurantPage, String> {
        let filter = search_filter(search);

        let mut sort = Document::new();
        sort.insert(search.sort.field(), 1);

        let find_opts = FindOptions::builder()
            .sort(sort)
            .skip(search.skip())
            .limit(SEARCH_PAGE_SIZE as i64)
            .build();

        let mut cursor = self
            .restaurants()
            .find(filter.clone(), find_opts)
            .await
            .map_err(|e| e.to_string())?;

        let mut data: Vec<Restaurant> = vec![];
        while let Some(res) = cursor.next().await {
            data.push(res.map_err(|e| e.to_string())?);
        }

        let total = self
            .restaurants()
            .count_documents(filter, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(RestaurantPage { data, total })
    }
}

#[async_trait]
impl OrderRepository for MongoStore {
    async fn insert_order(&self, order: &Order) -> Result<(), String> {
        self.orders()
            .insert_one(order, None)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn find_order(&self, id: ObjectId) -> Result<Option<Order>, String> {
        self.orders()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| e.to_string())
    }

    async fn mark_order_paid(&self, id: ObjectId, total_amount: i64) -> Result<MarkPaid, String> {
        let res = self
            .orders()
            .update_one(pending_order_filter(id), mark_paid_update(total_amount), None)
            .await
            .map_err(|e| e.to_string())?;

        if res.matched_count > 0 {
            return Ok(MarkPaid::Updated);
        }

        // nothing pending matched: either already paid or never existed
        match self.find_order(id).await? {
            Some(_) => Ok(MarkPaid::AlreadyPaid),
            None => Ok(MarkPaid::NotFound),
        }
    }

    async fn list_orders_for_user(&self, user_id: ObjectId) -> Result<Vec<OrderWithRelations>, String> {
        let find_opts = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();

        let mut cursor = self
            .orders()
            .find(doc! { "user": user_id }, find_opts)
            .await
            .map_err(|e| e.to_string())?;

        let mut orders: Vec<Order> = vec![];
        while let Some(res) = cursor.next().await {
            orders.push(res.map_err(|e| e.to_string())?);
        }

        let restaurant_ids: Vec<ObjectId> = orders
            .iter()
            .map(|o| o.restaurant)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut restaurants: HashMap<ObjectId, Restaurant> = HashMap::new();
        if !restaurant_ids.is_empty() {
            let mut cursor = self
                .restaurants()
                .find(doc! { "_id": { "$in": restaurant_ids } }, None)
                .await
                .map_err(|e| e.to_string())?;

            while let Some(res) = cursor.next().await {
                let r = res.map_err(|e| e.to_string())?;
                restaurants.insert(r.id, r);
            }
        }

        let user = self.find_user(user_id).await?;

        Ok(orders
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
impl UserRepository for MongoStore {
    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, String> {
        self.users()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| e.to_string())
    }

    async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, String> {
        self.users()
            .find_one(doc! { "auth0Id": auth0_id }, None)
            .await
            .map_err(|e| e.to_string())
    }

    async fn insert_user(&self, user: &User) -> Result<(), String> {
        self.users()
            .insert_one(user, None)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), String> {
        self.users()
            .replace_one(doc! { "_id": user.id }, user, None)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<(), String> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
