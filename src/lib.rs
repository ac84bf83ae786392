//! Library entrypoint for RustEats.
//!
//! `main.rs` only wires settings, storage and the payment client together;
//! integration tests under `tests/` build the same `AppState` with an
//! in-memory store and a fake payment gateway.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{store::Store, stripe::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: Arc<dyn Store>,
    pub payments: Arc<dyn PaymentGateway>,
}
