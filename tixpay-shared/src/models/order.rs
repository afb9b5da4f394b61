use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment status of an order as stored locally.
///
/// `Completed` and `Cancelled` are terminal: once stored, no further
/// transition is accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const TERMINAL: [OrderStatus; 2] = [OrderStatus::Completed, OrderStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown order status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A ticket purchase, created once in `Pending` and afterwards only touched
/// through status updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_code: String,
    pub email: String,
    pub full_name: String,
    pub mobile_number: String,
    pub payment_method: String,
    pub continent: String,
    /// Post-discount total in whole currency units.
    pub total_amount: i64,
    /// Discount percentage that was applied when the order was created.
    pub discount: i32,
    pub total_ticket: i32,
    pub status: OrderStatus,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub ticket_id: i64,
    pub ticket_type: String,
    pub country_name: String,
    pub city: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert an order; ids and timestamps come from storage.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub order_code: String,
    pub email: String,
    pub full_name: String,
    pub mobile_number: String,
    pub payment_method: String,
    pub continent: String,
    pub total_amount: i64,
    pub discount: i32,
    pub total_ticket: i32,
    pub status: OrderStatus,
    pub transaction_date: DateTime<Utc>,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub ticket_id: i64,
    pub ticket_type: String,
    pub country_name: String,
    pub city: String,
    pub quantity: i32,
}

// ============================================================================
// Read models
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub transaction_id: i64,
    pub order_id: String,
    pub full_name: String,
    pub email: String,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: String,
    pub continent: String,
    pub total_amount: i64,
    pub discount: i32,
    pub total_ticket: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub detail_transaction: Vec<OrderLineView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineView {
    pub detail_transaction_id: i64,
    pub ticket_id: i64,
    pub ticket_type: String,
    pub country_name: String,
    pub city: String,
    pub quantity: i32,
}

impl From<&OrderLine> for OrderLineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            detail_transaction_id: line.id,
            ticket_id: line.ticket_id,
            ticket_type: line.ticket_type.clone(),
            country_name: line.country_name.clone(),
            city: line.city.clone(),
            quantity: line.quantity,
        }
    }
}

impl OrderView {
    pub fn new(order: &Order, lines: &[OrderLine]) -> Self {
        Self {
            transaction_id: order.id,
            order_id: order.order_code.clone(),
            full_name: order.full_name.clone(),
            email: order.email.clone(),
            transaction_date: order.transaction_date,
            payment_method: order.payment_method.clone(),
            continent: order.continent.clone(),
            total_amount: order.total_amount,
            discount: order.discount,
            total_ticket: order.total_ticket,
            status: order.status,
            created_at: order.created_at,
            detail_transaction: lines.iter().map(OrderLineView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub transaction_id: i64,
    pub order_id: String,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: String,
    pub total_amount: i64,
    pub total_ticket: i32,
    pub status: OrderStatus,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            transaction_id: order.id,
            order_id: order.order_code.clone(),
            transaction_date: order.transaction_date,
            payment_method: order.payment_method.clone(),
            total_amount: order.total_amount,
            total_ticket: order.total_ticket,
            status: order.status,
        }
    }
}

/// Filter for listing a caller's orders. No ordering is guaranteed.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub email: String,
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [OrderStatus::Pending, OrderStatus::Completed, OrderStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("settlement".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_only_completed_and_cancelled_are_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
