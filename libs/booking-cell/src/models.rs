// libs/booking-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CORE RESERVATION MODELS
// ==============================================================================

/// A `specialist_schedules` row: one per (specialist, date, time).
/// `available` is the only field this system ever mutates. It is false
/// exactly while a non-cancelled reservation holds the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    pub specialist_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: i64,
    pub client_id: i64,
    pub specialist_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Append-only `reservation_history` row, one per status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub reservation_id: i64,
    pub status: ReservationStatus,
    pub recorded_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookReservationRequest {
    pub specialist_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Cancellation carries the denormalized slot key alongside the
/// reservation id; the workflow does not re-fetch the reservation before
/// cancelling, so the slot release is matched by (specialist, date, time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelReservationRequest {
    pub specialist_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// A reservation joined with its display fields, as returned by the
/// list queries (PostgREST embedded resources).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationView {
    pub reservation_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: ReservationStatus,
    pub specialist: SpecialistRef,
    pub service: ServiceRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistRef {
    pub first_name: String,
    pub last_name: String,
}

impl SpecialistRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRef {
    pub name: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReservationError {
    #[error("No slot exists for that specialist, date and time")]
    SlotNotFound,

    #[error("Slot is no longer available")]
    SlotUnavailable,

    #[error("Failed to create reservation: {0}")]
    ReservationInsert(String),

    #[error("Failed to update reservation: {0}")]
    ReservationUpdate(String),

    #[error("Failed to write history entry: {0}")]
    HistoryWrite(String),

    #[error("Database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_display_matches_store_values() {
        assert_eq!(ReservationStatus::Pending.to_string(), "pending");
        assert_eq!(ReservationStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(ReservationStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_slot_deserializes_from_store_row() {
        let slot: Slot = serde_json::from_value(json!({
            "id": 7,
            "specialist_id": 3,
            "date": "2024-06-01",
            "time": "10:00:00",
            "available": true
        })).unwrap();

        assert_eq!(slot.id, 7);
        assert_eq!(slot.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(slot.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert!(slot.available);
    }

    #[test]
    fn test_reservation_view_deserializes_embedded_fields() {
        let view: ReservationView = serde_json::from_value(json!({
            "reservation_id": 12,
            "date": "2024-06-01",
            "time": "10:00:00",
            "status": "pending",
            "specialist": { "first_name": "Ana", "last_name": "Torres" },
            "service": { "name": "Haircut" }
        })).unwrap();

        assert_eq!(view.status, ReservationStatus::Pending);
        assert_eq!(view.specialist.full_name(), "Ana Torres");
        assert_eq!(view.service.name, "Haircut");
    }
}
