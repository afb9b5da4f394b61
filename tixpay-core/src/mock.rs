//! In-memory stand-ins for every collaborator contract. Used by the unit tests
//! of the orchestration crates and by the API tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use tixpay_shared::models::events::{
    OrderTicketMessage, PdfEmailMessage, TicketStockMessage, TransactionCompletedMessage,
    TransactionCreatedMessage,
};
use tixpay_shared::models::order::{NewOrder, Order, OrderFilter, OrderLine, OrderStatus};
use tixpay_shared::models::ticket::{RegionStock, Ticket, TicketEvent};
use tixpay_shared::UserProfile;

use crate::eligibility::{EligibilityClient, EligibilityQuery};
use crate::identity::{IdentityClient, ProfileCache};
use crate::inventory::InventoryClient;
use crate::payment::{GatewayStatus, PaymentGateway, PaymentSession, SessionRequest, TransactionStatus};
use crate::publisher::EventPublisher;
use crate::repository::{InsertOutcome, OrderRepository, StatusWrite};
use crate::CoreError;

type DynError = Box<dyn std::error::Error + Send + Sync>;

fn unavailable(service: &str) -> DynError {
    Box::new(CoreError::InternalError(format!("{} unavailable", service)))
}

// ============================================================================
// Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<(Order, Vec<OrderLine>)>>,
    next_id: AtomicUsize,
    status_writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Store a finished order directly, bypassing the orchestrator.
    pub async fn seed(&self, order: &NewOrder) -> i64 {
        let record = self.build_record(order);
        let id = record.0.id;
        self.orders.lock().await.push(record);
        id
    }

    pub async fn order_count(&self) -> usize {
        self.orders.lock().await.len()
    }

    /// Number of conditional updates that actually changed a row.
    pub fn applied_status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    fn build_record(&self, order: &NewOrder) -> (Order, Vec<OrderLine>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let now = Utc::now();
        let stored = Order {
            id,
            user_id: order.user_id,
            order_code: order.order_code.clone(),
            email: order.email.clone(),
            full_name: order.full_name.clone(),
            mobile_number: order.mobile_number.clone(),
            payment_method: order.payment_method.clone(),
            continent: order.continent.clone(),
            total_amount: order.total_amount,
            discount: order.discount,
            total_ticket: order.total_ticket,
            status: order.status,
            transaction_date: order.transaction_date,
            created_at: now,
            updated_at: now,
        };
        let lines = order
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| OrderLine {
                id: id * 1000 + i as i64,
                order_id: id,
                ticket_id: line.ticket_id,
                ticket_type: line.ticket_type.clone(),
                country_name: line.country_name.clone(),
                city: line.city.clone(),
                quantity: line.quantity,
                created_at: now,
            })
            .collect();
        (stored, lines)
    }

    fn check_reads(&self) -> Result<(), DynError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("database"));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert_order(&self, order: &NewOrder) -> Result<InsertOutcome, DynError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable("database"));
        }
        let mut orders = self.orders.lock().await;
        if orders.iter().any(|(o, _)| o.order_code == order.order_code) {
            return Ok(InsertOutcome::DuplicateOrderCode);
        }
        let record = self.build_record(order);
        let id = record.0.id;
        orders.push(record);
        Ok(InsertOutcome::Created(id))
    }

    async fn find_by_id_for_owner(&self, id: i64, email: &str) -> Result<Option<Order>, DynError> {
        self.check_reads()?;
        let orders = self.orders.lock().await;
        Ok(orders
            .iter()
            .find(|(o, _)| o.id == id && o.email == email)
            .map(|(o, _)| o.clone()))
    }

    async fn find_by_order_code(&self, order_code: &str) -> Result<Option<Order>, DynError> {
        self.check_reads()?;
        let orders = self.orders.lock().await;
        Ok(orders
            .iter()
            .find(|(o, _)| o.order_code == order_code)
            .map(|(o, _)| o.clone()))
    }

    async fn lines_for_order(&self, order_id: i64) -> Result<Vec<OrderLine>, DynError> {
        self.check_reads()?;
        let orders = self.orders.lock().await;
        Ok(orders
            .iter()
            .find(|(o, _)| o.id == order_id)
            .map(|(_, lines)| lines.clone())
            .unwrap_or_default())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, DynError> {
        self.check_reads()?;
        let orders = self.orders.lock().await;
        Ok(orders
            .iter()
            .map(|(o, _)| o)
            .filter(|o| o.email == filter.email)
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect())
    }

    async fn update_status(&self, order_code: &str, status: OrderStatus) -> Result<StatusWrite, DynError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable("database"));
        }
        let mut orders = self.orders.lock().await;
        let Some((order, _)) = orders.iter_mut().find(|(o, _)| o.order_code == order_code) else {
            return Ok(StatusWrite::Missing);
        };
        if order.status.is_terminal() {
            return Ok(StatusWrite::Rejected);
        }
        order.status = status;
        order.updated_at = Utc::now();
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(StatusWrite::Applied)
    }

    async fn distinct_continents(&self, email: &str) -> Result<Vec<String>, DynError> {
        self.check_reads()?;
        let orders = self.orders.lock().await;
        let mut continents: Vec<String> = Vec::new();
        for (order, _) in orders.iter().filter(|(o, _)| o.email == email) {
            if !continents.contains(&order.continent) {
                continents.push(order.continent.clone());
            }
        }
        Ok(continents)
    }
}

// ============================================================================
// Payment gateway
// ============================================================================

#[derive(Default)]
pub struct MockPaymentGateway {
    statuses: Mutex<HashMap<String, GatewayStatus>>,
    sessions: Mutex<Vec<SessionRequest>>,
    cancelled: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn set_status(&self, status: GatewayStatus) {
        self.statuses.lock().await.insert(status.order_id.clone(), status);
    }

    pub async fn sessions(&self) -> Vec<SessionRequest> {
        self.sessions.lock().await.clone()
    }

    pub async fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, DynError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("payment gateway"));
        }
        self.sessions.lock().await.push(request.clone());
        Ok(PaymentSession {
            token: format!("mock_token_{}", request.order_code),
            redirect_url: format!("https://pay.example.test/v2/vtweb/{}", request.order_code),
        })
    }

    async fn transaction_status(&self, order_code: &str) -> Result<GatewayStatus, DynError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("payment gateway"));
        }
        Ok(self
            .statuses
            .lock()
            .await
            .get(order_code)
            .cloned()
            .unwrap_or_else(|| GatewayStatus {
                order_id: order_code.to_string(),
                transaction_status: TransactionStatus::Pending,
                fraud_status: None,
            }))
    }

    async fn cancel(&self, order_code: &str) -> Result<(), DynError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("payment gateway"));
        }
        self.cancelled.lock().await.push(order_code.to_string());
        Ok(())
    }
}

// ============================================================================
// Inventory, eligibility, identity
// ============================================================================

#[derive(Default)]
pub struct StaticInventory {
    pub tickets: Vec<Ticket>,
    pub stock: Vec<RegionStock>,
    pub events: HashMap<i64, TicketEvent>,
    fail: AtomicBool,
}

impl StaticInventory {
    pub fn new(tickets: Vec<Ticket>, stock: Vec<RegionStock>) -> Self {
        Self {
            tickets,
            stock,
            ..Self::default()
        }
    }

    pub fn with_event(mut self, event: TicketEvent) -> Self {
        self.events.insert(event.ticket_id, event);
        self
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl InventoryClient for StaticInventory {
    async fn tickets_by_region(&self, continent: &str) -> Result<Vec<Ticket>, DynError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("ticket service"));
        }
        Ok(self
            .tickets
            .iter()
            .filter(|t| t.continent_name.is_empty() || t.continent_name == continent)
            .cloned()
            .collect())
    }

    async fn stock_by_region(&self) -> Result<Vec<RegionStock>, DynError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("ticket service"));
        }
        Ok(self.stock.clone())
    }

    async fn ticket_event(&self, ticket_id: i64) -> Result<TicketEvent, DynError> {
        self.events
            .get(&ticket_id)
            .cloned()
            .ok_or_else(|| unavailable("ticket event"))
    }
}

/// Eligibility answer fixed at construction; `None` simulates an unreachable service.
pub struct StaticEligibility(pub Option<bool>);

#[async_trait]
impl EligibilityClient for StaticEligibility {
    async fn is_eligible(&self, _query: &EligibilityQuery) -> Result<bool, DynError> {
        self.0.ok_or_else(|| unavailable("rules service"))
    }
}

#[derive(Default)]
pub struct StaticIdentity {
    pub profile: Option<UserProfile>,
    calls: AtomicUsize,
}

impl StaticIdentity {
    pub fn new(profile: Option<UserProfile>) -> Self {
        Self {
            profile,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityClient for StaticIdentity {
    async fn fetch_profile(&self, _authorization: &str) -> Result<Option<UserProfile>, DynError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.profile.clone())
    }
}

#[derive(Default)]
pub struct InMemoryProfileCache {
    entries: Mutex<HashMap<String, UserProfile>>,
    fail: AtomicBool,
}

impl InMemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, email: &str) -> bool {
        self.entries.lock().await.contains_key(email)
    }
}

#[async_trait]
impl ProfileCache for InMemoryProfileCache {
    async fn get_profile(&self, email: &str) -> Result<Option<UserProfile>, DynError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("cache"));
        }
        Ok(self.entries.lock().await.get(email).cloned())
    }

    async fn put_profile(&self, email: &str, profile: &UserProfile, _ttl: Duration) -> Result<(), DynError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("cache"));
        }
        self.entries.lock().await.insert(email.to_string(), profile.clone());
        Ok(())
    }
}

// ============================================================================
// Publisher
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    OrderReserved(OrderTicketMessage),
    TicketSold(TicketStockMessage),
    TicketReturned(TicketStockMessage),
    PdfEmail(PdfEmailMessage),
    TransactionCreated(TransactionCreatedMessage),
    TransactionCompleted(TransactionCompletedMessage),
}

/// Records every event. When failing, the attempt is still recorded and an
/// error is returned, mirroring a broker that rejected the message.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<Published>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<Published> {
        self.events.lock().await.clone()
    }

    async fn record(&self, event: Published) -> Result<(), DynError> {
        self.events.lock().await.push(event);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable("broker"));
        }
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn order_reserved(&self, message: &OrderTicketMessage) -> Result<(), DynError> {
        self.record(Published::OrderReserved(message.clone())).await
    }

    async fn ticket_sold(&self, message: &TicketStockMessage) -> Result<(), DynError> {
        self.record(Published::TicketSold(message.clone())).await
    }

    async fn ticket_returned(&self, message: &TicketStockMessage) -> Result<(), DynError> {
        self.record(Published::TicketReturned(message.clone())).await
    }

    async fn pdf_email_requested(&self, message: &PdfEmailMessage) -> Result<(), DynError> {
        self.record(Published::PdfEmail(message.clone())).await
    }

    async fn transaction_created(&self, message: &TransactionCreatedMessage) -> Result<(), DynError> {
        self.record(Published::TransactionCreated(message.clone())).await
    }

    async fn transaction_completed(&self, message: &TransactionCompletedMessage) -> Result<(), DynError> {
        self.record(Published::TransactionCompleted(message.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tixpay_shared::models::order::NewOrderLine;

    fn new_order(code: &str) -> NewOrder {
        NewOrder {
            user_id: 1,
            order_code: code.to_string(),
            email: "a@example.com".to_string(),
            full_name: "A".to_string(),
            mobile_number: "1".to_string(),
            payment_method: "card".to_string(),
            continent: "Asia".to_string(),
            total_amount: 100,
            discount: 0,
            total_ticket: 1,
            status: OrderStatus::Pending,
            transaction_date: Utc::now(),
            lines: vec![NewOrderLine {
                ticket_id: 1,
                ticket_type: "VIP".to_string(),
                country_name: String::new(),
                city: String::new(),
                quantity: 1,
            }],
        }
    }

    #[tokio::test]
    async fn test_terminal_status_is_not_overwritten() {
        let repo = InMemoryOrderRepository::new();
        repo.insert_order(&new_order("ORDER-1")).await.unwrap();

        assert_eq!(repo.update_status("ORDER-1", OrderStatus::Completed).await.unwrap(), StatusWrite::Applied);
        assert_eq!(repo.update_status("ORDER-1", OrderStatus::Cancelled).await.unwrap(), StatusWrite::Rejected);
        assert_eq!(repo.update_status("ORDER-2", OrderStatus::Cancelled).await.unwrap(), StatusWrite::Missing);
        assert_eq!(repo.applied_status_writes(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_reported() {
        let repo = InMemoryOrderRepository::new();
        repo.insert_order(&new_order("ORDER-1")).await.unwrap();
        let outcome = repo.insert_order(&new_order("ORDER-1")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::DuplicateOrderCode);
        assert_eq!(repo.order_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_of_one_code_create_a_single_order() {
        let repo = std::sync::Arc::new(InMemoryOrderRepository::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert_order(&new_order("ORDER-RACE")).await.unwrap() })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), InsertOutcome::Created(_)) {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(repo.order_count().await, 1);
    }
}
