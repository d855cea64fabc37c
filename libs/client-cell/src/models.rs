use serde::{Deserialize, Serialize};

/// A row in the `clients` table. `auth_user_id` is the identity-provider
/// user id; `client_id` is the internal key every other table references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub client_id: i64,
    pub auth_user_id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("No client record for the authenticated user")]
    NotFound,

    #[error("Multiple client records match the authenticated user")]
    AmbiguousProfile,

    #[error("A client profile already exists for this user")]
    DuplicateProfile,

    #[error("Database error: {0}")]
    Database(String),
}
