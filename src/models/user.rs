use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    // subject of the identity provider token
    pub auth0_id: String,
    pub email: String,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Verified token subject, present on every request carrying a valid bearer token.
#[derive(Debug, Clone)]
pub struct TokenSubject(pub String);

/// The stored user behind the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: ObjectId,
    pub auth0_id: String,
    pub email: String,
}

impl From<User> for CurrentUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            auth0_id: u.auth0_id,
            email: u.email,
        }
    }
}
