use axum::{
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::Settings,
    error::AppError,
    models::{CurrentUser, TokenSubject},
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // identity provider subject
    pub sub: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

pub fn decode_subject(settings: &Settings, token: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let (algorithm, key) = match &settings.jwt_public_key {
        Some(pem) => (Algorithm::RS256, DecodingKey::from_rsa_pem(pem.as_bytes())?),
        None => (
            Algorithm::HS256,
            DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        ),
    };

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;

    match &settings.jwt_audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    if let Some(iss) = &settings.jwt_issuer {
        validation.set_issuer(&[iss]);
    }

    let data = decode::<Claims>(token, &key, &validation)?;

    Ok(data.claims.sub)
}

/// Verifies the bearer token and, when valid, stores the subject and the
/// matching user (if any) in request extensions.
pub async fn inject_current_user(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match decode_subject(&state.settings, bearer.token()) {
            Ok(sub) => {
                match state.store.find_user_by_auth0_id(&sub).await {
                    Ok(Some(user)) => {
                        req.extensions_mut().insert(CurrentUser::from(user));
                    }
                    Ok(None) => tracing::debug!(%sub, "no user for token subject"),
                    Err(e) => tracing::error!(error = %e, "user lookup failed"),
                }
                req.extensions_mut().insert(TokenSubject(sub));
            }
            Err(e) => tracing::debug!(error = %e, "rejected bearer token"),
        }
    }

    next.run(req).await
}

fn is_public_path(path: &str) -> bool {
    path == "/health"
        || path == "/health/db"
        || path == "/api/order/checkout/webhook"
        || path.starts_with("/api/restaurant/")
}

// creating your own profile only needs a valid token
fn needs_token_only(method: &Method, path: &str) -> bool {
    method == Method::POST && path == "/api/my/user"
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if is_public_path(path) {
        return next.run(req).await;
    }

    if needs_token_only(req.method(), path) && req.extensions().get::<TokenSubject>().is_some() {
        return next.run(req).await;
    }

    // If inject_current_user already put CurrentUser in extensions => authenticated
    if req.extensions().get::<CurrentUser>().is_some() {
        return next.run(req).await;
    }

    AppError::Unauthorized.into_response()
}
