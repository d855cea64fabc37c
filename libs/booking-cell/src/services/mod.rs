pub mod availability;
pub mod history;
pub mod reservation;

pub use availability::AvailabilityService;
pub use history::HistoryService;
pub use reservation::ReservationService;
