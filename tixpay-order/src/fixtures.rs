use chrono::{FixedOffset, TimeZone, Utc};
use std::sync::Arc;

use tixpay_core::mock::{
    InMemoryOrderRepository, MockPaymentGateway, RecordingPublisher, StaticEligibility, StaticInventory,
};
use tixpay_shared::models::order::{NewOrder, NewOrderLine, OrderStatus};
use tixpay_shared::models::ticket::{RegionStock, Ticket, TicketEvent};
use tixpay_shared::{PurchaseLine, PurchaseRequest, UserProfile};

use crate::{OrderOrchestrator, OrderSettings, PricingEvaluator, WebhookReconciler};

pub fn ticket(ticket_id: i64, ticket_type: &str, price: i64, stock: i64) -> Ticket {
    Ticket {
        ticket_id,
        ticket_type: ticket_type.to_string(),
        price,
        continent_name: "Asia".to_string(),
        stock,
        country_name: "Japan".to_string(),
        country_city: "Tokyo".to_string(),
        country_place: "Budokan".to_string(),
    }
}

pub fn caller() -> UserProfile {
    UserProfile {
        user_id: 7,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        full_name: "Alice Doe".to_string(),
        phone_number: "08123456789".to_string(),
        ..UserProfile::default()
    }
}

/// Ticket 1 qty 1 @ 100 and ticket 2 qty 2 @ 50.
pub fn two_line_request() -> PurchaseRequest {
    PurchaseRequest {
        payment_method: "bank_transfer".to_string(),
        continent: "Asia".to_string(),
        total_amount: Some(1),
        total_ticket: 3,
        lines: vec![
            PurchaseLine {
                ticket_id: 1,
                ticket_type: "VIP".to_string(),
                country_name: "Japan".to_string(),
                city: "Tokyo".to_string(),
                quantity: 1,
            },
            PurchaseLine {
                ticket_id: 2,
                ticket_type: "CAT1".to_string(),
                country_name: "Japan".to_string(),
                city: "Tokyo".to_string(),
                quantity: 2,
            },
        ],
    }
}

pub struct Harness {
    pub repo: Arc<InMemoryOrderRepository>,
    pub gateway: Arc<MockPaymentGateway>,
    pub publisher: Arc<RecordingPublisher>,
    pub inventory: Arc<StaticInventory>,
    pub eligibility: Arc<StaticEligibility>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Some(true), vec![RegionStock { continent: "Asia".to_string(), stock: 60 }])
    }

    pub fn with_eligibility(answer: Option<bool>) -> Self {
        Self::build(answer, vec![])
    }

    pub fn with_stock(stock: Vec<RegionStock>) -> Self {
        Self::build(Some(true), stock)
    }

    fn build(eligible: Option<bool>, stock: Vec<RegionStock>) -> Self {
        let inventory = StaticInventory::new(vec![ticket(1, "VIP", 100, 10), ticket(2, "CAT1", 50, 50)], stock)
            .with_event(TicketEvent {
                ticket_id: 1,
                ticket_type: "VIP".to_string(),
                price: 100,
                continent: "Asia".to_string(),
                country_city: "Tokyo".to_string(),
                country_place: "Budokan".to_string(),
                event_name: "Summer Tour".to_string(),
                date: FixedOffset::east_opt(9 * 3600)
                    .unwrap()
                    .with_ymd_and_hms(2025, 7, 1, 19, 30, 0)
                    .unwrap(),
                description: String::new(),
            });
        Self {
            repo: Arc::new(InMemoryOrderRepository::new()),
            gateway: Arc::new(MockPaymentGateway::new()),
            publisher: Arc::new(RecordingPublisher::new()),
            inventory: Arc::new(inventory),
            eligibility: Arc::new(StaticEligibility(eligible)),
        }
    }

    pub fn pricing(&self) -> PricingEvaluator {
        PricingEvaluator::new(
            self.eligibility.clone(),
            self.inventory.clone(),
            self.repo.clone(),
            self.publisher.clone(),
            20,
        )
    }

    pub fn orchestrator(&self) -> Arc<OrderOrchestrator> {
        Arc::new(OrderOrchestrator::new(
            self.pricing(),
            self.repo.clone(),
            self.gateway.clone(),
            self.publisher.clone(),
            OrderSettings::default(),
        ))
    }

    pub fn reconciler(&self) -> WebhookReconciler {
        WebhookReconciler::new(
            self.orchestrator(),
            self.gateway.clone(),
            self.inventory.clone(),
            self.publisher.clone(),
        )
    }

    pub async fn seed_history(&self, email: &str, continent: &str) {
        self.repo
            .seed(&NewOrder {
                user_id: 7,
                order_code: format!("ORDER-HIST-{}", continent),
                email: email.to_string(),
                full_name: "Alice Doe".to_string(),
                mobile_number: "08123456789".to_string(),
                payment_method: "card".to_string(),
                continent: continent.to_string(),
                total_amount: 100,
                discount: 0,
                total_ticket: 1,
                status: OrderStatus::Completed,
                transaction_date: Utc::now(),
                lines: vec![NewOrderLine {
                    ticket_id: 1,
                    ticket_type: "VIP".to_string(),
                    country_name: String::new(),
                    city: String::new(),
                    quantity: 1,
                }],
            })
            .await;
    }
}
