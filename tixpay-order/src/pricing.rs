use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use tixpay_core::eligibility::{EligibilityClient, EligibilityQuery};
use tixpay_core::inventory::InventoryClient;
use tixpay_core::publisher::EventPublisher;
use tixpay_core::repository::OrderRepository;
use tixpay_shared::models::events::OrderTicketMessage;
use tixpay_shared::models::ticket::Ticket;
use tixpay_shared::PurchaseRequest;

use crate::OrderError;

/// Price and discount computed from authoritative ticket data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub subtotal: i64,
    pub discount: i32,
    pub total: i64,
}

/// Decides whether a purchase is allowed right now and what it costs.
pub struct PricingEvaluator {
    eligibility: Arc<dyn EligibilityClient>,
    inventory: Arc<dyn InventoryClient>,
    repo: Arc<dyn OrderRepository>,
    publisher: Arc<dyn EventPublisher>,
    discount_percent: i32,
}

impl PricingEvaluator {
    pub fn new(
        eligibility: Arc<dyn EligibilityClient>,
        inventory: Arc<dyn InventoryClient>,
        repo: Arc<dyn OrderRepository>,
        publisher: Arc<dyn EventPublisher>,
        discount_percent: i32,
    ) -> Self {
        Self {
            eligibility,
            inventory,
            repo,
            publisher,
            discount_percent: discount_percent.clamp(0, 100),
        }
    }

    pub async fn evaluate(
        &self,
        request: &PurchaseRequest,
        caller_email: &str,
        now: DateTime<Utc>,
    ) -> Result<Quote, OrderError> {
        // 1. Eligibility fails closed
        self.check_eligible(now).await?;

        // 2. Price and stock against the region's tickets
        let tickets = self
            .inventory
            .tickets_by_region(&request.continent)
            .await
            .map_err(|e| OrderError::collaborator("ticket service", e))?;
        let subtotal = price_lines(request, &tickets)?;

        // 3. Best-effort reservation signal, one per line
        for line in &request.lines {
            let message = OrderTicketMessage {
                ticket_id: line.ticket_id,
                order: line.quantity,
            };
            if let Err(e) = self.publisher.order_reserved(&message).await {
                error!("Failed to publish order reservation for ticket {}: {}", line.ticket_id, e);
            }
        }

        // 4. Sold-out region discount
        let discount = self.discount_for(request, caller_email).await?;
        let total = apply_discount(subtotal, discount);

        info!(
            "Priced purchase in {}: subtotal {} discount {}% total {}",
            request.continent, subtotal, discount, total
        );

        Ok(Quote {
            subtotal,
            discount,
            total,
        })
    }

    async fn check_eligible(&self, now: DateTime<Utc>) -> Result<(), OrderError> {
        let query = EligibilityQuery::for_date(now);
        match self.eligibility.is_eligible(&query).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                info!("Purchase rejected: not eligible on {} {} {}", query.day, query.month, query.year);
                Err(OrderError::NotEligible)
            }
            Err(e) => {
                error!("Eligibility check unavailable, rejecting purchase: {}", e);
                Err(OrderError::NotEligible)
            }
        }
    }

    async fn discount_for(&self, request: &PurchaseRequest, caller_email: &str) -> Result<i32, OrderError> {
        let stock = self
            .inventory
            .stock_by_region()
            .await
            .map_err(|e| OrderError::collaborator("ticket service", e))?;

        let sold_out: Vec<&str> = stock
            .iter()
            .filter(|s| s.is_sold_out())
            .map(|s| s.continent.as_str())
            .collect();
        if sold_out.is_empty() {
            return Ok(0);
        }

        let history = self
            .repo
            .distinct_continents(caller_email)
            .await
            .map_err(|e| OrderError::collaborator("database", e))?;

        Ok(select_discount(&sold_out, &history, &request.continent, self.discount_percent))
    }
}

/// Sum of quantity × authoritative unit price. Stock is checked against the
/// total requested per ticket, so repeating a ticket across lines is counted once.
fn price_lines(request: &PurchaseRequest, tickets: &[Ticket]) -> Result<i64, OrderError> {
    let by_id: HashMap<i64, &Ticket> = tickets.iter().map(|t| (t.ticket_id, t)).collect();

    let mut requested: HashMap<i64, i64> = HashMap::new();
    let mut subtotal = 0i64;
    for line in &request.lines {
        let ticket = by_id.get(&line.ticket_id).ok_or_else(|| {
            warn!("Ticket {} not offered in {}", line.ticket_id, request.continent);
            OrderError::UnknownTicket(line.ticket_id)
        })?;

        let wanted = requested.entry(ticket.ticket_id).or_insert(0);
        *wanted += i64::from(line.quantity);
        if *wanted > ticket.stock {
            warn!(
                "Stock is not enough for ticket {}: requested {}, available {}",
                ticket.ticket_id, wanted, ticket.stock
            );
            return Err(OrderError::InsufficientStock {
                ticket_id: ticket.ticket_id,
                requested: i32::try_from(*wanted).unwrap_or(i32::MAX),
                available: ticket.stock,
            });
        }

        subtotal += i64::from(line.quantity) * ticket.price;
    }
    Ok(subtotal)
}

/// The single discount tier: applies when a sold-out region appears in the
/// caller's history and is not the region being bought now.
pub fn select_discount(sold_out: &[&str], history: &[String], current: &str, percent: i32) -> i32 {
    let qualifies = sold_out
        .iter()
        .any(|region| *region != current && history.iter().any(|h| h == region));
    if qualifies {
        percent
    } else {
        0
    }
}

pub fn apply_discount(subtotal: i64, percent: i32) -> i64 {
    subtotal * i64::from(100 - percent) / 100
}
