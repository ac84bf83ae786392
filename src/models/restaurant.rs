use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    // minor currency units
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    // owner
    pub user: ObjectId,

    pub restaurant_name: String,
    pub city: String,
    pub country: String,

    pub delivery_price: i64,
    pub estimated_delivery_time: i64,

    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,

    #[serde(default)]
    pub image_url: String,
    pub last_updated: DateTime,
}

impl Restaurant {
    pub fn find_menu_item(&self, menu_item_id: &str) -> Option<&MenuItem> {
        self.menu_items
            .iter()
            .find(|item| item.id.to_hex() == menu_item_id.trim())
    }
}
