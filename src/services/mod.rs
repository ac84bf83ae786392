pub mod db_init;
pub mod memory_store;
pub mod mongo_store;
pub mod store;

pub mod stripe;
pub mod stripe_webhook;

pub mod checkout_service;
pub mod order_service;
pub mod payment_service;
pub mod restaurant_service;
pub mod user_service;
