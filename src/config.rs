use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub storage_backend: StorageBackend,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub jwt_issuer: Option<String>,
    // PEM public key; when set, tokens must be RS256 signed by the provider
    pub jwt_public_key: Option<String>,

    pub stripe_api_key: String,
    pub stripe_api_base: String,
    pub stripe_webhook_secret: String,
    pub stripe_webhook_tolerance_secs: i64,
    pub checkout_currency: String,

    pub frontend_url: String,
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "rusteats".to_string());

    let storage_backend = match env::var("STORAGE_BACKEND").as_deref() {
        Ok("memory") => StorageBackend::Memory,
        _ => StorageBackend::Mongo,
    };

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(7000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());

    let stripe_api_key = env::var("STRIPE_API_KEY").unwrap_or_default();
    let stripe_api_base = env::var("STRIPE_API_BASE")
        .unwrap_or_else(|_| "https://api.stripe.com".to_string());
    let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default();
    let stripe_webhook_tolerance_secs = env::var("STRIPE_WEBHOOK_TOLERANCE_SECS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(300);
    let checkout_currency = env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| "usd".to_string());

    let frontend_url = env::var("FRONTEND_URL")
        .unwrap_or_else(|_| "http://localhost:5173".to_string())
        .trim_end_matches('/')
        .to_string();

    Settings {
        mongodb_uri,
        mongodb_db,
        storage_backend,
        host,
        port,
        jwt_secret,
        jwt_audience: optional("JWT_AUDIENCE"),
        jwt_issuer: optional("JWT_ISSUER"),
        // single-line env values carry the PEM newlines as \n
        jwt_public_key: optional("JWT_PUBLIC_KEY").map(|k| k.replace("\\n", "\n")),
        stripe_api_key,
        stripe_api_base,
        stripe_webhook_secret,
        stripe_webhook_tolerance_secs,
        checkout_currency,
        frontend_url,
    }
}
