mod common;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::http::StatusCode;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use common::*;
use rusteats::{
    models::{Order, OrderWithRelations, Restaurant, User},
    services::{
        memory_store::MemoryStore,
        store::{MarkPaid, OrderRepository, RestaurantPage, RestaurantRepository, RestaurantSearch, Store, UserRepository},
        user_service::{create_current_user, CreateUserRequest},
    },
    AppState,
};

#[tokio::test]
async fn get_current_user_returns_profile() {
    let app = test_app(GatewayMode::Succeed).await;
    let token = token_for(AUTH0_ID);

    let (status, body) = send(app.router(), get_request("/api/my/user", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], app.user.id.to_hex());
    assert_eq!(body["email"], "tester@example.com");
}

#[tokio::test]
async fn get_current_user_without_profile_returns_401() {
    let app = test_app(GatewayMode::Succeed).await;
    let token = token_for("auth0|newcomer");

    let (status, _) = send(app.router(), get_request("/api/my/user", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_or_expired_token_returns_401() {
    let app = test_app(GatewayMode::Succeed).await;

    let (status, _) = send(app.router(), get_request("/api/my/user", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &rusteats::auth::Claims {
            sub: AUTH0_ID.to_string(),
            exp: 1_000,
        },
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    let (status, _) = send(app.router(), get_request("/api/my/user", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn provider_public_key_switches_tokens_to_rs256() {
    let mut app = test_app(GatewayMode::Succeed).await;
    app.state.settings.jwt_public_key = Some(RS256_PUBLIC_KEY.to_string());

    let (status, body) = send(app.router(), get_request("/api/my/user", Some(&rs256_token_for(AUTH0_ID)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auth0Id"], AUTH0_ID);

    // shared-secret tokens no longer pass once the provider key is set
    let (status, _) = send(app.router(), get_request("/api/my/user", Some(&token_for(AUTH0_ID)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_current_user_is_idempotent() {
    let app = test_app(GatewayMode::Succeed).await;
    let token = token_for("auth0|newcomer");
    let body = json!({ "auth0Id": "auth0|newcomer", "email": "new@example.com" });

    let (status, created) = send(app.router(), json_request("POST", "/api/my/user", Some(&token), body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["auth0Id"], "auth0|newcomer");
    assert_eq!(created["email"], "new@example.com");

    let (status, again) = send(app.router(), json_request("POST", "/api/my/user", Some(&token), body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["_id"], created["_id"]);

    // the new profile now passes the user check
    let (status, _) = send(app.router(), get_request("/api/my/user", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_current_user_rejects_foreign_subject_and_missing_email() {
    let app = test_app(GatewayMode::Succeed).await;
    let token = token_for("auth0|newcomer");

    let (status, _) = send(
        app.router(),
        json_request("POST", "/api/my/user", Some(&token), json!({ "auth0Id": "auth0|someone", "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app.router(),
        json_request("POST", "/api/my/user", Some(&token), json!({ "auth0Id": "auth0|newcomer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email is required");
}

#[tokio::test]
async fn create_current_user_without_token_returns_401() {
    let app = test_app(GatewayMode::Succeed).await;

    let (status, _) = send(
        app.router(),
        json_request("POST", "/api/my/user", None, json!({ "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_current_user_requires_every_field() {
    let app = test_app(GatewayMode::Succeed).await;
    let token = token_for(AUTH0_ID);

    let (status, body) = send(
        app.router(),
        json_request(
            "PUT",
            "/api/my/user",
            Some(&token),
            json!({ "name": "Tess", "addressLine1": "1 High Street", "city": "  ", "country": "UK" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "city is required");
}

#[tokio::test]
async fn update_current_user_saves_profile() {
    let app = test_app(GatewayMode::Succeed).await;
    let token = token_for(AUTH0_ID);

    let (status, body) = send(
        app.router(),
        json_request(
            "PUT",
            "/api/my/user",
            Some(&token),
            json!({ "name": "Tess", "addressLine1": "1 High Street", "city": "London", "country": "UK" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Tess");
    assert_eq!(body["city"], "London");

    let (_, body) = send(app.router(), get_request("/api/my/user", Some(&token))).await;
    assert_eq!(body["addressLine1"], "1 High Street");
    assert_eq!(body["country"], "UK");
}

/// Reports the subject as unknown once, as if another request inserted the
/// profile between this request's lookup and its insert.
struct LateInsertStore {
    inner: MemoryStore,
    miss_next_lookup: AtomicBool,
}

#[async_trait]
impl RestaurantRepository for LateInsertStore {
    async fn find_restaurant(&self, id: ObjectId) -> Result<Option<Restaurant>, String> {
        self.inner.find_restaurant(id).await
    }

    async fn search_restaurants(&self, search: &RestaurantSearch) -> Result<RestaurantPage, String> {
        self.inner.search_restaurants(search).await
    }
}

#[async_trait]
impl OrderRepository for LateInsertStore {
    async fn insert_order(&self, order: &Order) -> Result<(), String> {
        self.inner.insert_order(order).await
    }

    async fn find_order(&self, id: ObjectId) -> Result<Option<Order>, String> {
        self.inner.find_order(id).await
    }

    async fn mark_order_paid(&self, id: ObjectId, total_amount: i64) -> Result<MarkPaid, String> {
        self.inner.mark_order_paid(id, total_amount).await
    }

    async fn list_orders_for_user(&self, user_id: ObjectId) -> Result<Vec<OrderWithRelations>, String> {
        self.inner.list_orders_for_user(user_id).await
    }
}

#[async_trait]
impl UserRepository for LateInsertStore {
    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, String> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, String> {
        if self.miss_next_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_user_by_auth0_id(auth0_id).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), String> {
        self.inner.insert_user(user).await
    }

    async fn update_user(&self, user: &User) -> Result<(), String> {
        self.inner.update_user(user).await
    }
}

#[async_trait]
impl Store for LateInsertStore {
    async fn ping(&self) -> Result<(), String> {
        Ok(())
    }
}

#[tokio::test]
async fn create_current_user_losing_the_insert_race_returns_existing_profile() {
    let winner = sample_user("auth0|racer");
    let inner = MemoryStore::new();
    inner.insert_user(&winner).await.unwrap();

    let store = Arc::new(LateInsertStore {
        inner,
        miss_next_lookup: AtomicBool::new(true),
    });
    let state = AppState {
        settings: test_settings(),
        store,
        payments: Arc::new(FakeGateway::new(Arc::new(MemoryStore::new()), GatewayMode::Succeed)),
    };

    let req = CreateUserRequest {
        auth0_id: Some("auth0|racer".to_string()),
        email: Some("racer@example.com".to_string()),
    };
    let (view, created) = create_current_user(&state, "auth0|racer", req).await.unwrap();

    assert!(!created);
    assert_eq!(view.id, winner.id.to_hex());
    assert_eq!(view.email, "tester@example.com");
}
