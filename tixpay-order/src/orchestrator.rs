use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

use tixpay_core::payment::{PaymentGateway, PaymentSession, SessionRequest};
use tixpay_core::publisher::EventPublisher;
use tixpay_core::repository::{InsertOutcome, OrderRepository, StatusWrite};
use tixpay_shared::models::events::{
    TransactionCompletedMessage, TransactionCreatedMessage, MESSAGE_DATE_FORMAT,
};
use tixpay_shared::models::order::{NewOrder, NewOrderLine, OrderFilter, OrderStatus};
use tixpay_shared::pii::Masked;
use tixpay_shared::{OrderSummary, OrderView, PurchaseRequest, UserProfile};

use crate::order_code::OrderCodeGenerator;
use crate::{OrderError, OrderSettings, PricingEvaluator};

/// Result of a successful purchase: where to pay and what was charged.
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    pub order_id: i64,
    pub order_code: String,
    pub session: PaymentSession,
    pub discount: i32,
    pub total: i64,
}

pub struct OrderOrchestrator {
    pricing: PricingEvaluator,
    repo: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    publisher: Arc<dyn EventPublisher>,
    codes: OrderCodeGenerator,
    settings: OrderSettings,
}

impl OrderOrchestrator {
    pub fn new(
        pricing: PricingEvaluator,
        repo: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        publisher: Arc<dyn EventPublisher>,
        settings: OrderSettings,
    ) -> Self {
        let codes = OrderCodeGenerator::new(settings.order_code_prefix.clone(), settings.order_code_length);
        Self {
            pricing,
            repo,
            gateway,
            publisher,
            codes,
            settings,
        }
    }

    /// Price, persist and open a payment session for a purchase.
    pub async fn create_transaction(
        &self,
        request: &PurchaseRequest,
        caller: &UserProfile,
    ) -> Result<CreatedTransaction, OrderError> {
        validate(request)?;

        let now = Utc::now();
        let quote = self.pricing.evaluate(request, &caller.email, now).await?;

        let mut order = NewOrder {
            user_id: caller.user_id,
            order_code: String::new(),
            email: caller.email.clone(),
            full_name: caller.full_name.clone(),
            mobile_number: caller.phone_number.clone(),
            payment_method: request.payment_method.clone(),
            continent: request.continent.clone(),
            total_amount: quote.total,
            discount: quote.discount,
            total_ticket: request.total_ticket,
            status: OrderStatus::Pending,
            transaction_date: now,
            lines: request
                .lines
                .iter()
                .map(|line| NewOrderLine {
                    ticket_id: line.ticket_id,
                    ticket_type: line.ticket_type.clone(),
                    country_name: line.country_name.clone(),
                    city: line.city.clone(),
                    quantity: line.quantity,
                })
                .collect(),
        };
        let order_id = self.insert_with_fresh_code(&mut order).await?;

        let session = self
            .gateway
            .create_session(&SessionRequest {
                order_code: order.order_code.clone(),
                gross_amount: (quote.total as f64 * self.settings.exchange_rate).round() as i64,
                customer_name: caller.full_name.clone(),
                customer_email: caller.email.clone(),
                customer_phone: caller.phone_number.clone(),
            })
            .await
            .map_err(|e| {
                error!("Payment session for {} failed: {}", order.order_code, e);
                OrderError::collaborator("payment gateway", e)
            })?;

        self.announce_created(&order, &session, now).await;

        info!(
            "Created order {} for {} (total {}, discount {}%)",
            order.order_code,
            Masked(&caller.email),
            quote.total,
            quote.discount
        );

        Ok(CreatedTransaction {
            order_id,
            order_code: order.order_code,
            session,
            discount: quote.discount,
            total: quote.total,
        })
    }

    async fn insert_with_fresh_code(&self, order: &mut NewOrder) -> Result<i64, OrderError> {
        for attempt in 1..=self.settings.order_code_attempts.max(1) {
            order.order_code = self.codes.generate();
            match self.repo.insert_order(order).await {
                Ok(InsertOutcome::Created(id)) => return Ok(id),
                Ok(InsertOutcome::DuplicateOrderCode) => {
                    warn!("Order code {} already taken (attempt {})", order.order_code, attempt);
                }
                Err(e) => {
                    error!("Failed to persist order {}: {}", order.order_code, e);
                    return Err(OrderError::collaborator("database", e));
                }
            }
        }
        Err(OrderError::collaborator(
            "database",
            "no free order code after retries".into(),
        ))
    }

    async fn announce_created(&self, order: &NewOrder, session: &PaymentSession, now: DateTime<Utc>) {
        let deadline = now + Duration::hours(self.settings.payment_deadline_hours);
        let message = TransactionCreatedMessage {
            order_id: order.order_code.clone(),
            email: order.email.clone(),
            url: session.redirect_url.clone(),
            name: order.full_name.clone(),
            date: now.format(MESSAGE_DATE_FORMAT).to_string(),
            deadline_date: deadline.format(MESSAGE_DATE_FORMAT).to_string(),
            total: order.total_amount,
        };
        if let Err(e) = self.publisher.transaction_created(&message).await {
            error!("Failed to publish transaction created for {}: {}", order.order_code, e);
        }
    }

    /// Fetch an order owned by the caller.
    pub async fn get_by_id(&self, id: i64, caller_email: &str) -> Result<OrderView, OrderError> {
        let order = self
            .repo
            .find_by_id_for_owner(id, caller_email)
            .await
            .map_err(|e| OrderError::collaborator("database", e))?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        self.view(&order).await
    }

    /// Fetch an order by its gateway-facing code, without an owner check.
    pub async fn get_by_order_code(&self, order_code: &str) -> Result<OrderView, OrderError> {
        let order = self
            .repo
            .find_by_order_code(order_code)
            .await
            .map_err(|e| OrderError::collaborator("database", e))?
            .ok_or_else(|| OrderError::NotFound(order_code.to_string()))?;
        self.view(&order).await
    }

    async fn view(&self, order: &tixpay_shared::Order) -> Result<OrderView, OrderError> {
        let lines = self
            .repo
            .lines_for_order(order.id)
            .await
            .map_err(|e| OrderError::collaborator("database", e))?;
        Ok(OrderView::new(order, &lines))
    }

    pub async fn list_for_caller(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, OrderError> {
        let orders = self
            .repo
            .list_orders(filter)
            .await
            .map_err(|e| OrderError::collaborator("database", e))?;
        Ok(orders.iter().map(OrderSummary::from).collect())
    }

    /// Conditional status write. Terminal orders are never rewritten; the
    /// completion notice goes out only when this call moved the order.
    pub async fn update_status(
        &self,
        order_code: &str,
        status: OrderStatus,
        caller_email: &str,
    ) -> Result<StatusWrite, OrderError> {
        let write = self
            .repo
            .update_status(order_code, status)
            .await
            .map_err(|e| OrderError::collaborator("database", e))?;

        match write {
            StatusWrite::Missing => return Err(OrderError::NotFound(order_code.to_string())),
            StatusWrite::Rejected => {
                info!("Order {} already terminal, {} not written", order_code, status);
            }
            StatusWrite::Applied => {
                info!("Order {} moved to {}", order_code, status);
                if status == OrderStatus::Completed {
                    let message = TransactionCompletedMessage {
                        order_id: order_code.to_string(),
                        email: caller_email.to_string(),
                        status: status.to_string(),
                    };
                    if let Err(e) = self.publisher.transaction_completed(&message).await {
                        error!("Failed to publish transaction completed for {}: {}", order_code, e);
                    }
                }
            }
        }
        Ok(write)
    }
}

fn validate(request: &PurchaseRequest) -> Result<(), OrderError> {
    if request.continent.trim().is_empty() {
        return Err(OrderError::InvalidRequest("continent is required".to_string()));
    }
    if request.lines.is_empty() {
        return Err(OrderError::InvalidRequest("detail_ticket must not be empty".to_string()));
    }
    if let Some(line) = request.lines.iter().find(|l| l.quantity <= 0) {
        return Err(OrderError::InvalidRequest(format!(
            "quantity for ticket {} must be positive",
            line.ticket_id
        )));
    }
    if request.requested_quantity() != i64::from(request.total_ticket) {
        return Err(OrderError::InvalidRequest(format!(
            "total_ticket {} does not match line quantities {}",
            request.total_ticket,
            request.requested_quantity()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Harness};
    use tixpay_core::mock::Published;

    #[tokio::test]
    async fn test_two_line_purchase_is_pending_at_200() {
        let h = Harness::new();
        let created = h
            .orchestrator()
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap();

        assert_eq!(created.total, 200);
        assert_eq!(created.discount, 0);
        assert!(created.order_code.starts_with("ORDER-"));
        assert_eq!(created.session.token, format!("mock_token_{}", created.order_code));

        let view = h.orchestrator().get_by_order_code(&created.order_code).await.unwrap();
        assert_eq!(view.status, OrderStatus::Pending);
        assert_eq!(view.total_amount, 200);
    }

    #[tokio::test]
    async fn test_lines_round_trip_through_order_code() {
        let h = Harness::new();
        let request = fixtures::two_line_request();
        let created = h
            .orchestrator()
            .create_transaction(&request, &fixtures::caller())
            .await
            .unwrap();

        let view = h.orchestrator().get_by_order_code(&created.order_code).await.unwrap();
        let stored: Vec<_> = view
            .detail_transaction
            .iter()
            .map(|l| (l.ticket_id, l.quantity, l.ticket_type.clone()))
            .collect();
        let submitted: Vec<_> = request
            .lines
            .iter()
            .map(|l| (l.ticket_id, l.quantity, l.ticket_type.clone()))
            .collect();
        assert_eq!(stored, submitted);
    }

    #[tokio::test]
    async fn test_session_carries_code_amount_and_contact() {
        let h = Harness::new();
        let created = h
            .orchestrator()
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap();

        let sessions = h.gateway.sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].order_code, created.order_code);
        assert_eq!(sessions[0].gross_amount, 200);
        assert_eq!(sessions[0].customer_email, "alice@example.com");
        assert_eq!(sessions[0].customer_phone, "08123456789");
    }

    #[tokio::test]
    async fn test_transaction_created_published_with_link() {
        let h = Harness::new();
        let created = h
            .orchestrator()
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap();

        let events = h.publisher.events().await;
        let message = events
            .iter()
            .find_map(|e| match e {
                Published::TransactionCreated(m) => Some(m.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(message.order_id, created.order_code);
        assert_eq!(message.url, created.session.redirect_url);
        assert_eq!(message.total, 200);
        assert_ne!(message.date, message.deadline_date);
    }

    #[tokio::test]
    async fn test_ineligible_purchase_writes_nothing() {
        let h = Harness::with_eligibility(Some(false));
        let err = h
            .orchestrator()
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::NotEligible));
        assert_eq!(h.repo.order_count().await, 0);
        assert!(h.gateway.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_stock_shortfall_writes_nothing() {
        let h = Harness::new();
        let mut request = fixtures::two_line_request();
        request.lines[0].quantity = 11;
        request.total_ticket = 13;

        let err = h
            .orchestrator()
            .create_transaction(&request, &fixtures::caller())
            .await
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(h.repo.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_split_lines_cannot_oversell_a_ticket() {
        let h = Harness::new();
        let mut request = fixtures::two_line_request();
        request.lines[1] = request.lines[0].clone();
        request.lines[0].quantity = 10;
        request.lines[1].quantity = 10;
        request.total_ticket = 20;

        let err = h
            .orchestrator()
            .create_transaction(&request, &fixtures::caller())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { ticket_id: 1, .. }));
        assert_eq!(h.repo.order_count().await, 0);
        assert!(h.gateway.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_line_quantities_must_match_ticket_count() {
        let h = Harness::new();
        let mut request = fixtures::two_line_request();
        request.total_ticket = 4;

        let err = h
            .orchestrator()
            .create_transaction(&request, &fixtures::caller())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidRequest(_)));

        request.total_ticket = 3;
        request.lines[0].quantity = 0;
        request.lines[1].quantity = 3;
        let err = h
            .orchestrator()
            .create_transaction(&request, &fixtures::caller())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidRequest(_)));
        assert!(h.publisher.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_database_failure_is_collaborator_error() {
        let h = Harness::new();
        h.repo.fail_writes(true);
        let err = h
            .orchestrator()
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Collaborator { service: "database", .. }));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_exhausted_code_retries_fail() {
        let h = Harness::new();
        let settings = OrderSettings {
            order_code_prefix: "ORDER-".to_string(),
            order_code_length: 1,
            order_code_attempts: 2,
            ..OrderSettings::default()
        };
        let orchestrator = OrderOrchestrator::new(
            h.pricing(),
            h.repo.clone(),
            h.gateway.clone(),
            h.publisher.clone(),
            settings,
        );
        // Occupy every one-digit code
        let mut request = fixtures::two_line_request();
        request.lines.truncate(1);
        request.total_ticket = 1;
        let mut created = 0;
        for _ in 0..200 {
            if orchestrator.create_transaction(&request, &fixtures::caller()).await.is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 10);
        assert_eq!(h.repo.order_count().await, 10);
    }

    #[tokio::test]
    async fn test_get_by_id_is_scoped_to_owner() {
        let h = Harness::new();
        let created = h
            .orchestrator()
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap();

        let own = h.orchestrator().get_by_id(created.order_id, "alice@example.com").await;
        assert!(own.is_ok());

        let other = h.orchestrator().get_by_id(created.order_id, "mallory@example.com").await;
        assert!(matches!(other, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let h = Harness::new();
        let orchestrator = h.orchestrator();
        let first = orchestrator
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap();
        orchestrator
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap();
        orchestrator
            .update_status(&first.order_code, OrderStatus::Completed, "alice@example.com")
            .await
            .unwrap();

        let all = orchestrator
            .list_for_caller(&OrderFilter { email: "alice@example.com".to_string(), status: None })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let completed = orchestrator
            .list_for_caller(&OrderFilter {
                email: "alice@example.com".to_string(),
                status: Some(OrderStatus::Completed),
            })
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].order_id, first.order_code);
    }

    #[tokio::test]
    async fn test_repeated_completion_is_written_and_announced_once() {
        let h = Harness::new();
        let orchestrator = h.orchestrator();
        let created = orchestrator
            .create_transaction(&fixtures::two_line_request(), &fixtures::caller())
            .await
            .unwrap();

        let first = orchestrator
            .update_status(&created.order_code, OrderStatus::Completed, "alice@example.com")
            .await
            .unwrap();
        let second = orchestrator
            .update_status(&created.order_code, OrderStatus::Completed, "alice@example.com")
            .await
            .unwrap();

        assert_eq!(first, StatusWrite::Applied);
        assert_eq!(second, StatusWrite::Rejected);
        assert_eq!(h.repo.applied_status_writes(), 1);

        let completed = h
            .publisher
            .events()
            .await
            .into_iter()
            .filter(|e| matches!(e, Published::TransactionCompleted(_)))
            .count();
        assert_eq!(completed, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_code_is_not_found() {
        let h = Harness::new();
        let err = h
            .orchestrator()
            .update_status("ORDER-404", OrderStatus::Cancelled, "alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }
}
