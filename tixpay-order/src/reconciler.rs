use std::sync::Arc;
use tracing::{error, info, warn};

use tixpay_core::inventory::InventoryClient;
use tixpay_core::payment::{FraudStatus, PaymentGateway, TransactionStatus};
use tixpay_core::publisher::EventPublisher;
use tixpay_core::repository::StatusWrite;
use tixpay_shared::models::events::{DetailTicket, PdfEmailMessage, TicketStockMessage, MESSAGE_DATE_FORMAT};
use tixpay_shared::models::order::{OrderLineView, OrderStatus};
use tixpay_shared::OrderView;

use crate::{OrderError, OrderOrchestrator};

/// Downstream work triggered by a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendPdfEmail,
    TicketSold { ticket_id: i64, quantity: i32 },
    TicketReturned { ticket_id: i64, quantity: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<OrderStatus>,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged() -> Self {
        Self {
            next: None,
            effects: Vec::new(),
        }
    }
}

/// Pure transition table from (stored status, gateway status, fraud status).
///
/// `next` is `None` when nothing should be written, which includes every
/// input on a terminal order and `pending` on a pending order.
pub fn transition(
    current: OrderStatus,
    gateway: TransactionStatus,
    fraud: Option<FraudStatus>,
    lines: &[OrderLineView],
) -> Transition {
    if current.is_terminal() {
        return Transition::unchanged();
    }

    let sold = || {
        lines.iter().map(|l| Effect::TicketSold {
            ticket_id: l.ticket_id,
            quantity: l.quantity,
        })
    };

    match (gateway, fraud) {
        (TransactionStatus::Capture, Some(FraudStatus::Accept)) => Transition {
            next: Some(OrderStatus::Completed),
            effects: sold().collect(),
        },
        (TransactionStatus::Settlement, _) => Transition {
            next: Some(OrderStatus::Completed),
            effects: std::iter::once(Effect::SendPdfEmail).chain(sold()).collect(),
        },
        (TransactionStatus::Cancel | TransactionStatus::Expire, _) => Transition {
            next: Some(OrderStatus::Cancelled),
            effects: lines
                .iter()
                .map(|l| Effect::TicketReturned {
                    ticket_id: l.ticket_id,
                    quantity: l.quantity,
                })
                .collect(),
        },
        // challenge/deny/pending and anything unrecognised leave the order as is
        _ => Transition::unchanged(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied(OrderStatus),
    Unchanged,
}

/// Pull the order code out of a gateway notification body.
pub fn extract_order_code(payload: &serde_json::Value) -> Result<String, OrderError> {
    payload
        .get("order_id")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| OrderError::InvalidRequest("order_id is required".to_string()))
}

/// Drives local order status from gateway notifications.
pub struct WebhookReconciler {
    orchestrator: Arc<OrderOrchestrator>,
    gateway: Arc<dyn PaymentGateway>,
    inventory: Arc<dyn InventoryClient>,
    publisher: Arc<dyn EventPublisher>,
}

impl WebhookReconciler {
    pub fn new(
        orchestrator: Arc<OrderOrchestrator>,
        gateway: Arc<dyn PaymentGateway>,
        inventory: Arc<dyn InventoryClient>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orchestrator,
            gateway,
            inventory,
            publisher,
        }
    }

    /// Reconcile one order against the gateway's authoritative status.
    ///
    /// Side effects run only when this call changed the stored status, so a
    /// redelivered notification is a no-op.
    pub async fn handle_notification(&self, order_code: &str) -> Result<ReconcileOutcome, OrderError> {
        let status = self
            .gateway
            .transaction_status(order_code)
            .await
            .map_err(|e| OrderError::collaborator("payment gateway", e))?;

        let order = self.orchestrator.get_by_order_code(order_code).await?;

        let step = transition(
            order.status,
            status.transaction_status,
            status.fraud_status,
            &order.detail_transaction,
        );
        let Some(next) = step.next else {
            info!(
                "Order {} unchanged ({:?}/{:?}, stored {})",
                order_code, status.transaction_status, status.fraud_status, order.status
            );
            return Ok(ReconcileOutcome::Unchanged);
        };

        let write = self.orchestrator.update_status(order_code, next, &order.email).await?;
        if write != StatusWrite::Applied {
            return Ok(ReconcileOutcome::Unchanged);
        }

        for effect in &step.effects {
            self.run(effect, &order).await;
        }
        Ok(ReconcileOutcome::Applied(next))
    }

    async fn run(&self, effect: &Effect, order: &OrderView) {
        match effect {
            Effect::SendPdfEmail => self.request_pdf(order).await,
            Effect::TicketSold { ticket_id, quantity } => {
                let message = TicketStockMessage {
                    order_id: order.order_id.clone(),
                    ticket_id: *ticket_id,
                    quantity: *quantity,
                };
                if let Err(e) = self.publisher.ticket_sold(&message).await {
                    error!("Failed to publish ticket sold for {} ticket {}: {}", order.order_id, ticket_id, e);
                }
            }
            Effect::TicketReturned { ticket_id, quantity } => {
                let message = TicketStockMessage {
                    order_id: order.order_id.clone(),
                    ticket_id: *ticket_id,
                    quantity: *quantity,
                };
                if let Err(e) = self.publisher.ticket_returned(&message).await {
                    error!("Failed to publish ticket return for {} ticket {}: {}", order.order_id, ticket_id, e);
                }
            }
        }
    }

    async fn request_pdf(&self, order: &OrderView) {
        let Some(first) = order.detail_transaction.first() else {
            warn!("Order {} has no lines, skipping ticket email", order.order_id);
            return;
        };
        let event = match self.inventory.ticket_event(first.ticket_id).await {
            Ok(event) => event,
            Err(e) => {
                error!("Event lookup for ticket {} failed, skipping ticket email: {}", first.ticket_id, e);
                return;
            }
        };

        let message = PdfEmailMessage {
            email: order.email.clone(),
            order_id: order.order_id.clone(),
            event_name: event.event_name,
            price: order.total_amount,
            number_of_ticket: order.total_ticket,
            event_date: event.date.format("%d %B %Y").to_string(),
            event_time: event.date.format("%H:%M").to_string(),
            venue: format!("{}, {}", event.country_place, event.country_city),
            customer_name: order.full_name.clone(),
            purchase_date: order.transaction_date.format(MESSAGE_DATE_FORMAT).to_string(),
            detail_tickets: order
                .detail_transaction
                .iter()
                .map(|l| DetailTicket {
                    ticket_type: l.ticket_type.clone(),
                    total_ticket: l.quantity,
                })
                .collect(),
        };
        if let Err(e) = self.publisher.pdf_email_requested(&message).await {
            error!("Failed to publish ticket email for {}: {}", order.order_id, e);
        }
    }

    /// Ask the gateway to cancel. Local status follows from the notification
    /// the gateway sends afterwards.
    pub async fn cancel_payment(&self, order_code: &str) -> Result<(), OrderError> {
        self.gateway.cancel(order_code).await.map_err(|e| {
            error!("Gateway cancel for {} failed: {}", order_code, e);
            OrderError::collaborator("payment gateway", e)
        })?;
        info!("Cancellation requested for {}", order_code);
        Ok(())
    }
}
