use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Client, ClientError, CreateClientRequest};

pub struct ClientService {
    supabase: Arc<SupabaseClient>,
}

impl ClientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Resolve the authenticated identity-provider user to the internal
    /// client id. Exactly one client row must match: zero is `NotFound`,
    /// more than one is `AmbiguousProfile` (booking under a guessed
    /// identity is never acceptable). Called once per request at the
    /// boundary, so workflow services always receive an already-resolved
    /// client id.
    pub async fn resolve_client_id(
        &self,
        auth_user_id: &str,
        auth_token: &str,
    ) -> Result<i64, ClientError> {
        let client = self.get_by_auth_user(auth_user_id, auth_token).await?;
        Ok(client.client_id)
    }

    pub async fn get_by_auth_user(
        &self,
        auth_user_id: &str,
        auth_token: &str,
    ) -> Result<Client, ClientError> {
        debug!("Resolving client record for user {}", auth_user_id);

        let path = format!("/rest/v1/clients?auth_user_id=eq.{}", auth_user_id);
        let mut result: Vec<Client> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| ClientError::Database(e.to_string()))?;

        match result.len() {
            0 => Err(ClientError::NotFound),
            1 => Ok(result.remove(0)),
            n => {
                warn!("{} client rows match user {}", n, auth_user_id);
                Err(ClientError::AmbiguousProfile)
            }
        }
    }

    /// Create the client profile that binds the identity-provider user to
    /// the booking data. One profile per user; a second insert is rejected
    /// before hitting the store.
    pub async fn create_client(
        &self,
        auth_user_id: &str,
        request: CreateClientRequest,
        auth_token: &str,
    ) -> Result<Client, ClientError> {
        match self.get_by_auth_user(auth_user_id, auth_token).await {
            Ok(_) => return Err(ClientError::DuplicateProfile),
            Err(ClientError::NotFound) => {}
            Err(e) => return Err(e),
        }

        let client_data = json!({
            "auth_user_id": auth_user_id,
            "first_name": request.first_name,
            "last_name": request.last_name
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/clients",
            Some(auth_token),
            Some(client_data),
            Some(headers),
        ).await.map_err(|e| ClientError::Database(e.to_string()))?;

        let row = result.into_iter().next()
            .ok_or_else(|| ClientError::Database("Failed to create client".to_string()))?;

        let client: Client = serde_json::from_value(row)
            .map_err(|e| ClientError::Database(format!("Failed to parse created client: {}", e)))?;

        info!("Client {} registered for user {}", client.client_id, auth_user_id);
        Ok(client)
    }
}
