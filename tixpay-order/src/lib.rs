pub mod error;
pub mod order_code;
pub mod pricing;
pub mod profile;
pub mod orchestrator;
pub mod reconciler;

use std::time::Duration;

pub use error::OrderError;
pub use orchestrator::{CreatedTransaction, OrderOrchestrator};
pub use pricing::{PricingEvaluator, Quote};
pub use profile::ProfileResolver;
pub use reconciler::{ReconcileOutcome, WebhookReconciler};

/// Business rules the orchestration layer needs at runtime.
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub discount_percent: i32,
    pub order_code_prefix: String,
    pub order_code_length: usize,
    pub order_code_attempts: u32,
    pub payment_deadline_hours: i64,
    /// Multiplier from the ticket currency to the gateway currency.
    pub exchange_rate: f64,
    pub profile_cache_ttl: Duration,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            discount_percent: 20,
            order_code_prefix: "ORDER-".to_string(),
            order_code_length: 10,
            order_code_attempts: 3,
            payment_deadline_hours: 24,
            exchange_rate: 1.0,
            profile_cache_ttl: Duration::from_secs(21 * 24 * 60 * 60),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
