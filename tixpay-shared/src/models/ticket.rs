use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Ticket as reported by the inventory service. `price` is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: i64,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub price: i64,
    #[serde(default)]
    pub continent_name: String,
    pub stock: i64,
    #[serde(default)]
    pub country_name: String,
    #[serde(default)]
    pub country_city: String,
    #[serde(default)]
    pub country_place: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStock {
    pub continent: String,
    pub stock: i64,
}

impl RegionStock {
    pub fn is_sold_out(&self) -> bool {
        self.stock <= 0
    }
}

/// Event and venue metadata attached to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvent {
    pub ticket_id: i64,
    #[serde(rename = "type", default)]
    pub ticket_type: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub continent: String,
    #[serde(default)]
    pub country_city: String,
    #[serde(default)]
    pub country_place: String,
    pub event_name: String,
    /// Kept in the venue's own offset so formatted times stay local.
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub description: String,
}
