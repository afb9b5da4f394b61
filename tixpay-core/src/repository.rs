use async_trait::async_trait;
use tixpay_shared::models::order::{NewOrder, Order, OrderFilter, OrderLine, OrderStatus};

/// Result of an insert attempt. A clash on the order code is not an error:
/// the caller is expected to retry with a fresh code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(i64),
    DuplicateOrderCode,
}

/// Result of a conditional status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    /// The row was updated.
    Applied,
    /// The order exists but is already terminal; nothing was written.
    Rejected,
    /// No order with this code.
    Missing,
}

/// Repository contract for orders and their lines.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and all of its lines atomically.
    async fn insert_order(
        &self,
        order: &NewOrder,
    ) -> Result<InsertOutcome, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_id_for_owner(
        &self,
        id: i64,
        email: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_order_code(
        &self,
        order_code: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn lines_for_order(
        &self,
        order_id: i64,
    ) -> Result<Vec<OrderLine>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Set the status unless the stored status is already terminal.
    /// Implementations must make the check and the write a single atomic step.
    async fn update_status(
        &self,
        order_code: &str,
        status: OrderStatus,
    ) -> Result<StatusWrite, Box<dyn std::error::Error + Send + Sync>>;

    /// Regions the caller has bought tickets for in the past.
    async fn distinct_continents(
        &self,
        email: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}
