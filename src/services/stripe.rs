use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub currency: String,
    // minor currency units
    pub unit_amount: i64,
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingRate {
    pub display_name: String,
    pub currency: String,
    pub amount: i64,
}

/// Everything needed to open a hosted, one-time payment checkout page.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionParams {
    pub line_items: Vec<LineItem>,
    pub shipping: ShippingRate,
    pub client_reference_id: String,
    // copied onto the session and onto its payment intent
    pub metadata: BTreeMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, params: &CheckoutSessionParams) -> Result<CheckoutSession, String>;
}

/// Flatten session params into Stripe's bracketed form encoding.
pub fn session_form(params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![];

    for (i, item) in params.line_items.iter().enumerate() {
        let p = format!("line_items[{i}]");
        form.push((format!("{p}[price_data][currency]"), item.currency.clone()));
        form.push((format!("{p}[price_data][unit_amount]"), item.unit_amount.to_string()));
        form.push((format!("{p}[price_data][product_data][name]"), item.product_name.clone()));
        form.push((format!("{p}[quantity]"), item.quantity.to_string()));
    }

    let s = "shipping_options[0][shipping_rate_data]";
    form.push((format!("{s}[display_name]"), params.shipping.display_name.clone()));
    form.push((format!("{s}[type]"), "fixed_amount".to_string()));
    form.push((format!("{s}[fixed_amount][amount]"), params.shipping.amount.to_string()));
    form.push((format!("{s}[fixed_amount][currency]"), params.shipping.currency.clone()));

    form.push(("mode".to_string(), "payment".to_string()));
    form.push(("client_reference_id".to_string(), params.client_reference_id.clone()));

    for (k, v) in &params.metadata {
        form.push((format!("metadata[{k}]"), v.clone()));
    }
    for (k, v) in &params.metadata {
        form.push((format!("payment_intent_data[metadata][{k}]"), v.clone()));
    }

    form.push(("success_url".to_string(), params.success_url.clone()));
    form.push(("cancel_url".to_string(), params.cancel_url.clone()));

    form
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    api_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(&self, params: &CheckoutSessionParams) -> Result<CheckoutSession, String> {
        if !self.has_key() {
            return Err("STRIPE_API_KEY is missing in .env".to_string());
        }

        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .form(&session_form(params))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();

            // prefer the provider's own message, never echo our request back
            return Err(match serde_json::from_str::<StripeErrorBody>(&body) {
                Ok(StripeErrorBody { error: StripeErrorDetail { message: Some(m) } }) => m,
                _ => format!("Stripe create session failed: {status}"),
            });
        }

        res.json::<CheckoutSession>().await.map_err(|e| e.to_string())
    }
}
