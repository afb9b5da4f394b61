use serde::{Deserialize, Serialize};

/// Reservation signal sent to the ticket service for each requested line,
/// before the order itself is known to succeed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderTicketMessage {
    pub ticket_id: i64,
    pub order: i32,
}

/// Per-line stock movement: used both for "ticket sold" confirmations and for
/// returning tickets to stock.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TicketStockMessage {
    pub order_id: String,
    pub ticket_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TransactionCreatedMessage {
    pub order_id: String,
    pub email: String,
    pub url: String,
    pub name: String,
    pub date: String,
    pub deadline_date: String,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TransactionCompletedMessage {
    pub order_id: String,
    pub email: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PdfEmailMessage {
    pub email: String,
    pub order_id: String,
    pub event_name: String,
    pub price: i64,
    pub number_of_ticket: i32,
    pub event_date: String,
    pub event_time: String,
    pub venue: String,
    pub customer_name: String,
    pub purchase_date: String,
    pub detail_tickets: Vec<DetailTicket>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub ticket_type: String,
    pub total_ticket: i32,
}

/// Date layout shared with the notification service, e.g. `02 January 2006 15:04:05`.
pub const MESSAGE_DATE_FORMAT: &str = "%d %B %Y %H:%M:%S";
