#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::{oid::ObjectId, DateTime};
use tower::ServiceExt;

use rusteats::{
    auth::Claims,
    config::{Settings, StorageBackend},
    models::{CartItem, DeliveryDetails, MenuItem, Order, OrderStatus, Restaurant, User},
    routes,
    services::{
        memory_store::MemoryStore,
        store::{OrderRepository, UserRepository},
        stripe::{CheckoutSession, CheckoutSessionParams, PaymentGateway},
        stripe_webhook,
    },
    AppState,
};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const AUTH0_ID: &str = "auth0|tester";
pub const SESSION_URL: &str = "https://checkout.example.test/c/pay/cs_test_1";

pub fn test_settings() -> Settings {
    Settings {
        mongodb_uri: "mongodb://localhost:27017".to_string(),
        mongodb_db: "rusteats_test".to_string(),
        storage_backend: StorageBackend::Memory,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_audience: None,
        jwt_issuer: None,
        jwt_public_key: None,
        stripe_api_key: String::new(),
        stripe_api_base: "http://127.0.0.1:1".to_string(),
        stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
        stripe_webhook_tolerance_secs: 300,
        checkout_currency: "usd".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GatewayMode {
    Succeed,
    Fail,
    NoUrl,
}

/// Records every session request and what the store held for that order at
/// the moment of the call.
pub struct FakeGateway {
    store: Arc<MemoryStore>,
    mode: GatewayMode,
    pub calls: Mutex<Vec<CheckoutSessionParams>>,
    pub order_status_at_call: Mutex<Vec<Option<OrderStatus>>>,
}

impl FakeGateway {
    pub fn new(store: Arc<MemoryStore>, mode: GatewayMode) -> Self {
        Self {
            store,
            mode,
            calls: Mutex::new(vec![]),
            order_status_at_call: Mutex::new(vec![]),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(&self, params: &CheckoutSessionParams) -> Result<CheckoutSession, String> {
        let order_id = ObjectId::parse_str(&params.client_reference_id).map_err(|e| e.to_string())?;
        let status = self
            .store
            .find_order(order_id)
            .await?
            .map(|o| o.status);

        self.order_status_at_call.lock().unwrap().push(status);
        self.calls.lock().unwrap().push(params.clone());

        match self.mode {
            GatewayMode::Succeed => Ok(CheckoutSession {
                id: "cs_test_1".to_string(),
                url: Some(SESSION_URL.to_string()),
            }),
            GatewayMode::Fail => Err("Your card network is on fire".to_string()),
            GatewayMode::NoUrl => Ok(CheckoutSession {
                id: "cs_test_1".to_string(),
                url: None,
            }),
        }
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<FakeGateway>,
    pub user: User,
    pub restaurant: Restaurant,
}

impl TestApp {
    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    pub fn burger_id(&self) -> String {
        self.restaurant.menu_items[0].id.to_hex()
    }

    pub fn fries_id(&self) -> String {
        self.restaurant.menu_items[1].id.to_hex()
    }
}

pub fn sample_restaurant() -> Restaurant {
    Restaurant {
        id: ObjectId::new(),
        user: ObjectId::new(),
        restaurant_name: "Burger Barn".to_string(),
        city: "London".to_string(),
        country: "United Kingdom".to_string(),
        delivery_price: 300,
        estimated_delivery_time: 30,
        cuisines: vec!["Burgers".to_string(), "American".to_string()],
        menu_items: vec![
            MenuItem {
                id: ObjectId::new(),
                name: "Burger".to_string(),
                price: 500,
            },
            MenuItem {
                id: ObjectId::new(),
                name: "Fries".to_string(),
                price: 250,
            },
        ],
        image_url: String::new(),
        last_updated: DateTime::now(),
    }
}

pub fn sample_user(auth0_id: &str) -> User {
    User {
        id: ObjectId::new(),
        auth0_id: auth0_id.to_string(),
        email: "tester@example.com".to_string(),
        name: None,
        address_line1: None,
        city: None,
        country: None,
    }
}

pub async fn test_app(mode: GatewayMode) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(FakeGateway::new(store.clone(), mode));

    let user = sample_user(AUTH0_ID);
    store.insert_user(&user).await.unwrap();

    let restaurant = sample_restaurant();
    store.seed_restaurant(restaurant.clone()).await;

    let state = AppState {
        settings: test_settings(),
        store: store.clone(),
        payments: gateway.clone(),
    };

    TestApp {
        state,
        store,
        gateway,
        user,
        restaurant,
    }
}

pub fn pending_order(restaurant: &Restaurant, user: &User) -> Order {
    Order {
        id: ObjectId::new(),
        restaurant: restaurant.id,
        user: user.id,
        delivery_details: DeliveryDetails {
            email: "tester@example.com".to_string(),
            name: "Tess Ter".to_string(),
            address_line1: "1 High Street".to_string(),
            city: "London".to_string(),
        },
        cart_items: vec![CartItem {
            menu_item_id: restaurant.menu_items[0].id.to_hex(),
            name: "Burger".to_string(),
            quantity: 2,
        }],
        total_amount: None,
        status: OrderStatus::PendingPayment,
        created_at: DateTime::now(),
    }
}

pub fn token_for(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub const RS256_PRIVATE_KEY: &str = include_str!("../fixtures/jwt_rs256_private.pem");
pub const RS256_PUBLIC_KEY: &str = include_str!("../fixtures/jwt_rs256_public.pem");

pub fn rs256_token_for(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::new(jsonwebtoken::Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(RS256_PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn signature_header(secret: &str, timestamp: i64, payload: &str) -> String {
    let sig = stripe_webhook::sign_payload(secret, timestamp, payload.as_bytes()).unwrap();
    format!("t={timestamp},v1={sig}")
}

pub fn webhook_request(payload: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/order/checkout/webhook")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(sig) = signature {
        builder = builder.header("Stripe-Signature", sig);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

pub fn signed_webhook_request(payload: &str) -> Request<Body> {
    let sig = signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), payload);
    webhook_request(payload, Some(sig))
}

pub fn completed_event(metadata: serde_json::Value, amount_total: Option<i64>) -> String {
    serde_json::json!({
        "id": "evt_test_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_1",
                "object": "checkout.session",
                "metadata": metadata,
                "amount_total": amount_total,
            }
        }
    })
    .to_string()
}

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}
