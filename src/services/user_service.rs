use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{CurrentUser, User},
    AppState,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub auth0_id: String,
    pub email: String,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_hex(),
            auth0_id: u.auth0_id,
            email: u.email,
            name: u.name,
            address_line1: u.address_line1,
            city: u.city,
            country: u.country,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub auth0_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// The profile fields after trimming, all non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub address_line1: String,
    pub city: String,
    pub country: String,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

pub fn validate_update(req: UpdateUserRequest) -> Result<ProfileUpdate, AppError> {
    Ok(ProfileUpdate {
        name: required(req.name, "name")?,
        address_line1: required(req.address_line1, "addressLine1")?,
        city: required(req.city, "city")?,
        country: required(req.country, "country")?,
    })
}

pub async fn get_current_user(state: &AppState, user: &CurrentUser) -> Result<UserView, AppError> {
    state
        .store
        .find_user(user.id)
        .await
        .map_err(AppError::Internal)?
        .map(UserView::from)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Returns the profile for the token subject and whether it was just created.
pub async fn create_current_user(
    state: &AppState,
    subject: &str,
    req: CreateUserRequest,
) -> Result<(UserView, bool), AppError> {
    if let Some(claimed) = req.auth0_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if claimed != subject {
            return Err(AppError::Validation("auth0Id does not match the token".into()));
        }
    }

    if let Some(existing) = state
        .store
        .find_user_by_auth0_id(subject)
        .await
        .map_err(AppError::Internal)?
    {
        return Ok((UserView::from(existing), false));
    }

    let email = required(req.email, "email")?;

    let user = User {
        id: ObjectId::new(),
        auth0_id: subject.to_string(),
        email,
        name: None,
        address_line1: None,
        city: None,
        country: None,
    };

    if let Err(e) = state.store.insert_user(&user).await {
        // a concurrent first request for the same subject may have won
        return match state
            .store
            .find_user_by_auth0_id(subject)
            .await
            .map_err(AppError::Internal)?
        {
            Some(existing) => {
                tracing::debug!(user_id = %existing.id, "user created concurrently");
                Ok((UserView::from(existing), false))
            }
            None => Err(AppError::Internal(e)),
        };
    }

    tracing::info!(user_id = %user.id, "user created");

    Ok((UserView::from(user), true))
}

pub async fn update_current_user(
    state: &AppState,
    user: &CurrentUser,
    req: UpdateUserRequest,
) -> Result<UserView, AppError> {
    let update = validate_update(req)?;

    let mut db_user = state
        .store
        .find_user(user.id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    db_user.name = Some(update.name);
    db_user.address_line1 = Some(update.address_line1);
    db_user.city = Some(update.city);
    db_user.country = Some(update.country);

    state
        .store
        .update_user(&db_user)
        .await
        .map_err(AppError::Internal)?;

    Ok(UserView::from(db_user))
}
