// libs/booking-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ReservationError, Slot};

#[derive(Debug, Deserialize)]
struct ReservedTime {
    time: NaiveTime,
}

/// Read-only slot queries used by the booking screens.
pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Open slots for a specialist on a date, ordered by time ascending.
    pub async fn slots_for_specialist(
        &self,
        specialist_id: i64,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Slot>, ReservationError> {
        debug!("Loading open slots for specialist {} on {}", specialist_id, date);

        let path = format!(
            "/rest/v1/specialist_schedules?specialist_id=eq.{}&date=eq.{}&available=is.true&order=time.asc",
            specialist_id, date
        );

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))
    }

    /// Open slots for a specialist offering a given service, with a second
    /// pass that drops times already held by a non-cancelled reservation for
    /// that (specialist, service, date). The availability flag should make
    /// the filter redundant; it stays because reservations and schedules are
    /// maintained by separate writes and can drift.
    pub async fn open_slots_for_service(
        &self,
        specialist_id: i64,
        service_id: i64,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Slot>, ReservationError> {
        let slots = self.slots_for_specialist(specialist_id, date, auth_token).await?;

        let path = format!(
            "/rest/v1/reservations?select=time&specialist_id=eq.{}&service_id=eq.{}&date=eq.{}&status=neq.cancelled",
            specialist_id, service_id, date
        );

        let reserved: Vec<ReservedTime> = self
            .supabase
            .request::<Vec<Value>>(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))?
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();

        let reserved_times: Vec<NaiveTime> = reserved.into_iter().map(|r| r.time).collect();

        Ok(slots
            .into_iter()
            .filter(|slot| !reserved_times.contains(&slot.time))
            .collect())
    }
}
