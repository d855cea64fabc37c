use serde::{Deserialize, Serialize};

/// Read-only `specialists` row. This system never writes specialists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialist {
    pub specialist_id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Specialist {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Read-only `services` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub service_id: i64,
    pub name: String,
    pub price: f64,
}

/// Join row linking a specialist to a service they offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistServiceLink {
    pub specialist_id: i64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),
}
