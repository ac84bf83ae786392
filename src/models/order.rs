use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::{Restaurant, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Paid => "paid",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub restaurant: ObjectId,
    pub user: ObjectId,

    pub delivery_details: DeliveryDetails,
    pub cart_items: Vec<CartItem>,

    // settled amount in minor units, only set once paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<i64>,

    pub status: OrderStatus,
    pub created_at: DateTime,
}

/// An order with its restaurant and user documents joined in. Either side is
/// `None` when the referenced document no longer exists.
#[derive(Debug, Clone)]
pub struct OrderWithRelations {
    pub order: Order,
    pub restaurant: Option<Restaurant>,
    pub user: Option<User>,
}
