use async_trait::async_trait;
use tixpay_shared::models::ticket::{RegionStock, Ticket, TicketEvent};

/// Read side of the ticket/inventory service.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    async fn tickets_by_region(
        &self,
        continent: &str,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>>;

    /// Remaining stock summed per region
    async fn stock_by_region(
        &self,
    ) -> Result<Vec<RegionStock>, Box<dyn std::error::Error + Send + Sync>>;

    async fn ticket_event(
        &self,
        ticket_id: i64,
    ) -> Result<TicketEvent, Box<dyn std::error::Error + Send + Sync>>;
}
