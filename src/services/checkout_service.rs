use std::collections::BTreeMap;

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::Deserialize;

use crate::{
    config::Settings,
    error::AppError,
    models::{CartItem, CurrentUser, DeliveryDetails, Order, OrderStatus, Restaurant},
    AppState,
};

use super::stripe::{CheckoutSessionParams, LineItem, ShippingRate};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    #[serde(default)]
    pub menu_item_id: String,
    #[serde(default)]
    pub name: String,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    #[serde(default)]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub cart_items: Option<Vec<CartItemRequest>>,
    #[serde(default)]
    pub delivery_details: Option<DeliveryDetails>,
}

/// A cart that passed shape checks. Nothing has been looked up yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCheckout {
    pub restaurant_id: String,
    pub cart_items: Vec<CartItem>,
    pub delivery_details: DeliveryDetails,
}

fn parse_quantity(q: &Quantity) -> Option<i64> {
    let n = match q {
        Quantity::Text(s) => s.trim().parse::<i64>().ok()?,
        Quantity::Number(n) => *n,
    };
    (n > 0).then_some(n)
}

pub fn validate_checkout(req: CheckoutSessionRequest) -> Result<ValidCheckout, AppError> {
    let restaurant_id = req
        .restaurant_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("restaurantId is required".into()))?;

    let items = req
        .cart_items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::Validation("cartItems is required".into()))?;

    let mut cart_items: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        let menu_item_id = item.menu_item_id.trim().to_string();
        if menu_item_id.is_empty() {
            return Err(AppError::Validation("menuItemId is required".into()));
        }

        let Some(quantity) = parse_quantity(&item.quantity) else {
            return Err(AppError::Validation(format!(
                "Invalid quantity for menu item: {menu_item_id}"
            )));
        };

        cart_items.push(CartItem {
            menu_item_id,
            name: item.name,
            quantity,
        });
    }

    Ok(ValidCheckout {
        restaurant_id,
        cart_items,
        delivery_details: req.delivery_details.unwrap_or_default(),
    })
}

/// Price every cart entry from the restaurant's own catalog.
pub fn create_line_items(
    cart_items: &[CartItem],
    restaurant: &Restaurant,
    currency: &str,
) -> Result<Vec<LineItem>, AppError> {
    cart_items
        .iter()
        .map(|cart_item| -> Result<LineItem, AppError> {
            let menu_item = restaurant
                .find_menu_item(&cart_item.menu_item_id)
                .ok_or_else(|| AppError::NotFound(format!("Menu item not found: {}", cart_item.menu_item_id)))?;

            Ok(LineItem {
                currency: currency.to_string(),
                unit_amount: menu_item.price,
                product_name: menu_item.name.clone(),
                quantity: cart_item.quantity,
            })
        })
        .collect()
}

pub fn session_params(
    settings: &Settings,
    order_id: &ObjectId,
    restaurant: &Restaurant,
    line_items: Vec<LineItem>,
) -> CheckoutSessionParams {
    let order_id = order_id.to_hex();
    let restaurant_id = restaurant.id.to_hex();

    let mut metadata = BTreeMap::new();
    metadata.insert("orderId".to_string(), order_id.clone());
    metadata.insert("restaurantId".to_string(), restaurant_id.clone());

    CheckoutSessionParams {
        line_items,
        shipping: ShippingRate {
            display_name: "Delivery".to_string(),
            currency: settings.checkout_currency.clone(),
            amount: restaurant.delivery_price,
        },
        client_reference_id: order_id,
        metadata,
        success_url: format!("{}/order-status?success=true", settings.frontend_url),
        cancel_url: format!("{}/detail/{}?cancelled=true", settings.frontend_url, restaurant_id),
    }
}

/// Validate the cart, store a pending order, then open a hosted checkout page
/// for it. Returns the page URL.
///
/// The order is written before the processor is called so a completion event
/// can never refer to an order that was not stored. If the processor call
/// fails the pending order is left in place.
pub async fn create_checkout_session(
    state: &AppState,
    user: &CurrentUser,
    req: CheckoutSessionRequest,
) -> Result<String, AppError> {
    let checkout = validate_checkout(req)?;

    let not_found = || AppError::NotFound("Restaurant not found".into());
    let restaurant_id = ObjectId::parse_str(&checkout.restaurant_id).map_err(|_| not_found())?;
    let restaurant = state
        .store
        .find_restaurant(restaurant_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(not_found)?;

    let line_items = create_line_items(
        &checkout.cart_items,
        &restaurant,
        &state.settings.checkout_currency,
    )?;

    let order = Order {
        id: ObjectId::new(),
        restaurant: restaurant.id,
        user: user.id,
        delivery_details: checkout.delivery_details,
        cart_items: checkout.cart_items,
        total_amount: None,
        status: OrderStatus::PendingPayment,
        created_at: DateTime::now(),
    };

    state
        .store
        .insert_order(&order)
        .await
        .map_err(AppError::Internal)?;

    tracing::info!(order_id = %order.id, restaurant_id = %restaurant.id, "pending order stored");

    let params = session_params(&state.settings, &order.id, &restaurant, line_items);

    let session = state
        .payments
        .create_checkout_session(&params)
        .await
        .map_err(|e| {
            tracing::error!(order_id = %order.id, error = %e, "create checkout session failed");
            AppError::Upstream(e)
        })?;

    let url = session
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            tracing::error!(order_id = %order.id, session_id = %session.id, "checkout session missing url");
            AppError::Upstream("Error creating stripe session".into())
        })?;

    Ok(url)
}
