// libs/booking-cell/src/services/history.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_database::supabase::SupabaseClient;

use crate::models::{HistoryEntry, ReservationError, ReservationStatus};

/// Append-only audit trail for reservation status transitions. Writes are
/// best-effort from the workflow's point of view: the caller decides
/// whether a failure matters (it never does for bookings).
pub struct HistoryService {
    supabase: Arc<SupabaseClient>,
}

impl HistoryService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn append(
        &self,
        reservation_id: i64,
        status: ReservationStatus,
        auth_token: &str,
    ) -> Result<(), ReservationError> {
        debug!("Appending {} history entry for reservation {}", status, reservation_id);

        let entry = json!({
            "reservation_id": reservation_id,
            "status": status.to_string(),
            "recorded_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/reservation_history",
                Some(auth_token),
                Some(entry),
                Some(headers),
            )
            .await
            .map_err(|e| ReservationError::HistoryWrite(e.to_string()))?;

        Ok(())
    }

    pub async fn list(
        &self,
        reservation_id: i64,
        auth_token: &str,
    ) -> Result<Vec<HistoryEntry>, ReservationError> {
        let path = format!(
            "/rest/v1/reservation_history?reservation_id=eq.{}&order=recorded_at.asc",
            reservation_id
        );

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))
    }
}
