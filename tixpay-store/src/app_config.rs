use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    pub services: ServicesConfig,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    #[serde(default)]
    pub topics: TopicConfig,
}

/// One topic per fan-out event kind.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TopicConfig {
    pub order_reservation: String,
    pub ticket_sold: String,
    pub ticket_return: String,
    pub send_pdf_email: String,
    pub transaction_created: String,
    pub transaction_completed: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            order_reservation: "order-ticket".to_string(),
            ticket_sold: "ticket-sold".to_string(),
            ticket_return: "return-ticket".to_string(),
            send_pdf_email: "send-pdf-email".to_string(),
            transaction_created: "transaction-created".to_string(),
            transaction_completed: "transaction-completed".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub user_service_url: String,
    pub ticket_service_url: String,
    pub rules_service_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 10 }

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub server_key: String,
    pub snap_url: String,
    pub core_api_url: String,
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,
}

fn default_exchange_rate() -> f64 { 1.0 }

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BusinessRules {
    pub discount_percent: i32,
    pub order_code_prefix: String,
    pub order_code_length: usize,
    pub order_code_attempts: u32,
    pub payment_deadline_hours: i64,
    pub profile_cache_ttl_seconds: u64,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            discount_percent: 20,
            order_code_prefix: "ORDER-".to_string(),
            order_code_length: 10,
            order_code_attempts: 3,
            payment_deadline_hours: 24,
            profile_cache_ttl_seconds: 21 * 24 * 60 * 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TIXPAY_PAYMENT__SERVER_KEY=...`
            .add_source(config::Environment::with_prefix("TIXPAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
