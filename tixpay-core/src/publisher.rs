use async_trait::async_trait;
use tixpay_shared::models::events::{
    OrderTicketMessage, PdfEmailMessage, TicketStockMessage, TransactionCompletedMessage,
    TransactionCreatedMessage,
};

/// Fan-out to downstream services. One method per logical event; delivery is
/// at-least-once and consumers are expected to be idempotent.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn order_reserved(
        &self,
        message: &OrderTicketMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn ticket_sold(
        &self,
        message: &TicketStockMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn ticket_returned(
        &self,
        message: &TicketStockMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn pdf_email_requested(
        &self,
        message: &PdfEmailMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn transaction_created(
        &self,
        message: &TransactionCreatedMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn transaction_completed(
        &self,
        message: &TransactionCompletedMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
