//! Signed webhook events from the payment processor.
//!
//! The `Stripe-Signature` header looks like `t=1492774577,v1=5257a8...,v1=...`.
//! Each `v1` is a hex HMAC-SHA256 over `"{t}.{raw body}"` keyed with the
//! endpoint secret. Nothing in the body is trusted until one of them matches.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature header")]
    MissingHeader,
    #[error("unable to extract timestamp and signatures from header")]
    MalformedHeader,
    #[error("no signatures found matching the expected signature for payload")]
    Mismatch,
    #[error("timestamp outside the tolerance zone")]
    StaleTimestamp,
    #[error("webhook secret is not configured")]
    MissingSecret,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// The parts of a completed checkout session this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedSession {
    pub id: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
}

impl CompletedSession {
    pub fn order_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("orderId"))
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

impl Event {
    pub fn completed_session(&self) -> Result<CompletedSession, String> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| e.to_string())
    }
}

/// Hex signature for `payload` signed at `timestamp`.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mac = mac_for(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::MissingSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

fn parse_header(header: &str) -> Result<(i64, Vec<Vec<u8>>), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = vec![];

    for part in header.split(',') {
        let mut it = part.trim().splitn(2, '=');
        let (Some(k), Some(v)) = (it.next(), it.next()) else {
            continue;
        };
        match k {
            "t" => timestamp = v.parse::<i64>().ok(),
            // undecodable entries simply never match
            "v1" => {
                if let Ok(bytes) = hex::decode(v) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(t) if !signatures.is_empty() => Ok((t, signatures)),
        Some(_) => Err(SignatureError::Mismatch),
        None => Err(SignatureError::MalformedHeader),
    }
}

/// Check the signature header against `payload`, `now` being unix seconds.
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    if secret.trim().is_empty() {
        return Err(SignatureError::MissingSecret);
    }

    let header = header
        .filter(|h| !h.trim().is_empty())
        .ok_or(SignatureError::MissingHeader)?;
    let (timestamp, signatures) = parse_header(header)?;

    let mut matched = false;
    for sig in &signatures {
        if mac_for(secret, timestamp, payload)?.verify_slice(sig).is_ok() {
            matched = true;
            break;
        }
    }
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    if tolerance_secs > 0 && (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::StaleTimestamp);
    }

    Ok(())
}

/// Verify then parse. The body is only interpreted after the signature holds.
pub fn construct_event(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<Event, SignatureError> {
    verify_signature(payload, header, secret, tolerance_secs, now)?;

    serde_json::from_slice::<Event>(payload).map_err(|e| SignatureError::InvalidPayload(e.to_string()))
}
