// libs/booking-cell/src/services/reservation.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    BookReservationRequest, CancelReservationRequest, Reservation, ReservationError,
    ReservationStatus, ReservationView, Slot,
};
use crate::services::history::HistoryService;

/// The reservation workflow: claim a slot, record the reservation, keep a
/// best-effort audit trail, and support symmetric cancellation.
///
/// Callers pass an already-resolved client id; identity resolution happens
/// once per request at the HTTP boundary, never inside these methods.
pub struct ReservationService {
    supabase: Arc<SupabaseClient>,
    history: HistoryService,
}

impl ReservationService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let history = HistoryService::new(Arc::clone(&supabase));

        Self { supabase, history }
    }

    /// Book a slot for a client.
    ///
    /// Sequence: fetch the slot, claim it with a conditional update, insert
    /// the reservation, append a history row. The claim is a single
    /// predicate-guarded write (`available=is.true`), so two callers racing
    /// past the read cannot both claim the slot: the loser's update matches
    /// zero rows and fails with `SlotUnavailable`.
    ///
    /// If the reservation insert fails after the claim succeeded, the slot
    /// stays claimed with no reservation behind it. That partial state is
    /// reported as a plain failure; callers cannot distinguish it from
    /// "nothing happened".
    pub async fn create_reservation(
        &self,
        client_id: i64,
        request: BookReservationRequest,
        auth_token: &str,
    ) -> Result<Reservation, ReservationError> {
        info!(
            "Booking slot for client {} with specialist {} at {} {}",
            client_id, request.specialist_id, request.date, request.time
        );

        let slot = self
            .get_slot(request.specialist_id, request.date, request.time, auth_token)
            .await?;

        if !slot.available {
            return Err(ReservationError::SlotUnavailable);
        }

        self.claim_slot(slot.id, auth_token).await?;

        let reservation = self.insert_reservation(client_id, &request, auth_token).await?;

        // Best-effort audit: a dropped history row never fails the booking.
        if let Err(e) = self
            .history
            .append(reservation.reservation_id, ReservationStatus::Pending, auth_token)
            .await
        {
            warn!(
                "History write failed for reservation {}: {}",
                reservation.reservation_id, e
            );
        }

        info!(
            "Reservation {} created for client {}",
            reservation.reservation_id, client_id
        );
        Ok(reservation)
    }

    /// Cancel a reservation and free its slot.
    ///
    /// The slot is released by natural key (specialist, date, time), not by
    /// slot row id; a release that matches zero rows is silently fine. No
    /// status check precedes the update, so re-cancelling an already
    /// cancelled reservation succeeds and re-frees the slot even if another
    /// booking has since claimed it. Known gap, preserved deliberately;
    /// see DESIGN.md.
    pub async fn cancel_reservation(
        &self,
        reservation_id: i64,
        request: CancelReservationRequest,
        auth_token: &str,
    ) -> Result<(), ReservationError> {
        debug!("Cancelling reservation {}", reservation_id);

        self.update_reservation_status(reservation_id, ReservationStatus::Cancelled, auth_token)
            .await?;

        self.release_slot(request.specialist_id, request.date, request.time, auth_token)
            .await?;

        if let Err(e) = self
            .history
            .append(reservation_id, ReservationStatus::Cancelled, auth_token)
            .await
        {
            warn!("History write failed for reservation {}: {}", reservation_id, e);
        }

        info!("Reservation {} cancelled", reservation_id);
        Ok(())
    }

    /// Active reservations for a client, with specialist and service display
    /// fields embedded, ordered by date then time ascending.
    pub async fn list_active_reservations(
        &self,
        client_id: i64,
        auth_token: &str,
    ) -> Result<Vec<ReservationView>, ReservationError> {
        debug!("Listing active reservations for client {}", client_id);

        let path = format!(
            "/rest/v1/reservations?select={}&client_id=eq.{}&status=neq.cancelled&order=date.asc,time.asc",
            Self::VIEW_COLUMNS, client_id
        );

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))
    }

    /// The client's most recent active reservation: same filter as
    /// `list_active_reservations`, descending, limit 1.
    pub async fn most_recent_reservation(
        &self,
        client_id: i64,
        auth_token: &str,
    ) -> Result<Option<ReservationView>, ReservationError> {
        debug!("Fetching most recent reservation for client {}", client_id);

        let path = format!(
            "/rest/v1/reservations?select={}&client_id=eq.{}&status=neq.cancelled&order=date.desc,time.desc&limit=1",
            Self::VIEW_COLUMNS, client_id
        );

        let result: Vec<ReservationView> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))?;

        Ok(result.into_iter().next())
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    const VIEW_COLUMNS: &'static str =
        "reservation_id,date,time,status,specialist:specialists(first_name,last_name),service:services(name)";

    async fn get_slot(
        &self,
        specialist_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        auth_token: &str,
    ) -> Result<Slot, ReservationError> {
        let path = format!(
            "/rest/v1/specialist_schedules?specialist_id=eq.{}&date=eq.{}&time=eq.{}",
            specialist_id,
            date,
            time.format("%H:%M:%S")
        );

        let result: Vec<Slot> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))?;

        result.into_iter().next().ok_or(ReservationError::SlotNotFound)
    }

    /// Mark the slot taken. The `available=is.true` predicate makes this a
    /// compare-and-set: zero returned rows means another booking won the
    /// slot between our read and this write.
    async fn claim_slot(&self, slot_id: i64, auth_token: &str) -> Result<(), ReservationError> {
        let path = format!(
            "/rest/v1/specialist_schedules?id=eq.{}&available=is.true",
            slot_id
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "available": false })),
                Some(headers),
            )
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))?;

        if result.is_empty() {
            debug!("Slot {} claim matched zero rows, lost the race", slot_id);
            return Err(ReservationError::SlotUnavailable);
        }

        Ok(())
    }

    /// Re-free a slot by its natural key. Matching zero rows is not an
    /// error: the slot row may have been removed or re-keyed since booking.
    async fn release_slot(
        &self,
        specialist_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        auth_token: &str,
    ) -> Result<(), ReservationError> {
        let path = format!(
            "/rest/v1/specialist_schedules?specialist_id=eq.{}&date=eq.{}&time=eq.{}",
            specialist_id,
            date,
            time.format("%H:%M:%S")
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "available": true })),
                Some(headers),
            )
            .await
            .map_err(|e| ReservationError::Database(e.to_string()))?;

        if result.is_empty() {
            debug!(
                "Slot release for specialist {} at {} {} matched zero rows",
                specialist_id, date, time
            );
        }

        Ok(())
    }

    async fn insert_reservation(
        &self,
        client_id: i64,
        request: &BookReservationRequest,
        auth_token: &str,
    ) -> Result<Reservation, ReservationError> {
        let reservation_data = json!({
            "client_id": client_id,
            "specialist_id": request.specialist_id,
            "service_id": request.service_id,
            "date": request.date,
            "time": request.time.format("%H:%M:%S").to_string(),
            "status": ReservationStatus::Pending.to_string()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/reservations",
                Some(auth_token),
                Some(reservation_data),
                Some(headers),
            )
            .await
            .map_err(|e| ReservationError::ReservationInsert(e.to_string()))?;

        let row = result.into_iter().next().ok_or_else(|| {
            ReservationError::ReservationInsert("Failed to create reservation".to_string())
        })?;

        serde_json::from_value(row).map_err(|e| {
            ReservationError::ReservationInsert(format!("Failed to parse created reservation: {}", e))
        })
    }

    async fn update_reservation_status(
        &self,
        reservation_id: i64,
        status: ReservationStatus,
        auth_token: &str,
    ) -> Result<(), ReservationError> {
        let path = format!("/rest/v1/reservations?reservation_id=eq.{}", reservation_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status": status.to_string() })),
                Some(headers),
            )
            .await
            .map_err(|e| ReservationError::ReservationUpdate(e.to_string()))?;

        Ok(())
    }
}
