use std::sync::Arc;

use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CatalogError, Service, Specialist, SpecialistServiceLink};

pub struct CatalogService {
    supabase: Arc<SupabaseClient>,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub async fn list_specialists(&self, auth_token: &str) -> Result<Vec<Specialist>, CatalogError> {
        debug!("Listing specialists");

        let path = "/rest/v1/specialists?select=specialist_id,first_name,last_name&order=last_name.asc";
        self.supabase.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await.map_err(|e| CatalogError::Database(e.to_string()))
    }

    pub async fn list_services(&self, auth_token: &str) -> Result<Vec<Service>, CatalogError> {
        debug!("Listing services");

        let path = "/rest/v1/services?select=service_id,name,price&order=name.asc";
        self.supabase.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await.map_err(|e| CatalogError::Database(e.to_string()))
    }

    /// Specialists offering a given service, resolved through the
    /// `specialist_services` join table: fetch the linked ids, then the
    /// specialist rows with an `in.(...)` filter.
    pub async fn specialists_for_service(
        &self,
        service_id: i64,
        auth_token: &str,
    ) -> Result<Vec<Specialist>, CatalogError> {
        debug!("Listing specialists for service {}", service_id);

        let path = format!(
            "/rest/v1/specialist_services?select=specialist_id&service_id=eq.{}",
            service_id
        );
        let links: Vec<SpecialistServiceLink> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| CatalogError::Database(e.to_string()))?;

        if links.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = links.iter().map(|l| l.specialist_id.to_string()).collect();
        let path = format!(
            "/rest/v1/specialists?select=specialist_id,first_name,last_name&specialist_id=in.({})",
            ids.join(",")
        );
        self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| CatalogError::Database(e.to_string()))
    }
}
