use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::{
    error::AppError,
    models::{CartItem, DeliveryDetails, OrderStatus, OrderWithRelations},
    AppState,
};

use super::restaurant_service::{fmt_date, RestaurantView};
use super::user_service::UserView;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(rename = "_id")]
    pub id: String,
    pub restaurant: Option<RestaurantView>,
    pub user: Option<UserView>,
    pub delivery_details: DeliveryDetails,
    pub cart_items: Vec<CartItem>,
    pub total_amount: Option<i64>,
    pub status: OrderStatus,
    pub created_at: String,
}

impl From<OrderWithRelations> for OrderView {
    fn from(o: OrderWithRelations) -> Self {
        Self {
            id: o.order.id.to_hex(),
            restaurant: o.restaurant.map(RestaurantView::from),
            user: o.user.map(UserView::from),
            created_at: fmt_date(&o.order.created_at),
            delivery_details: o.order.delivery_details,
            cart_items: o.order.cart_items,
            total_amount: o.order.total_amount,
            status: o.order.status,
        }
    }
}

pub async fn list_my_orders(state: &AppState, user_id: ObjectId) -> Result<Vec<OrderView>, AppError> {
    let orders = state
        .store
        .list_orders_for_user(user_id)
        .await
        .map_err(AppError::Internal)?;

    Ok(orders.into_iter().map(OrderView::from).collect())
}
