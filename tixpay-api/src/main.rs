use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tixpay_api::{app, AppState, AuthConfig};
use tixpay_order::{OrderOrchestrator, OrderSettings, PricingEvaluator, ProfileResolver, WebhookReconciler};
use tixpay_store::app_config::Config;
use tixpay_store::{DbClient, EventProducer, HttpClients, PgOrderRepository, RedisProfileCache};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tixpay_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting TixPay API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;
    let repo = Arc::new(PgOrderRepository::new(db.pool.clone()));

    // Redis
    let cache = Arc::new(
        RedisProfileCache::new(&config.redis.url)
            .await
            .context("Failed to connect to Redis")?,
    );

    // Kafka
    let publisher = Arc::new(
        EventProducer::new(&config.kafka.brokers, config.kafka.topics.clone())
            .context("Failed to create Kafka producer")?,
    );

    // Outbound HTTP
    let clients = HttpClients::new(&config.services, &config.payment).context("Failed to build HTTP client")?;
    let inventory = Arc::new(clients.tickets);
    let gateway = Arc::new(clients.gateway);

    let rules = &config.business_rules;
    let settings = OrderSettings {
        discount_percent: rules.discount_percent,
        order_code_prefix: rules.order_code_prefix.clone(),
        order_code_length: rules.order_code_length,
        order_code_attempts: rules.order_code_attempts,
        payment_deadline_hours: rules.payment_deadline_hours,
        exchange_rate: config.payment.exchange_rate,
        profile_cache_ttl: Duration::from_secs(rules.profile_cache_ttl_seconds),
    };

    let pricing = PricingEvaluator::new(
        Arc::new(clients.rules),
        inventory.clone(),
        repo.clone(),
        publisher.clone(),
        settings.discount_percent,
    );
    let profiles = Arc::new(ProfileResolver::new(
        Arc::new(clients.users),
        cache,
        settings.profile_cache_ttl,
    ));
    let orchestrator = Arc::new(OrderOrchestrator::new(
        pricing,
        repo,
        gateway.clone(),
        publisher.clone(),
        settings,
    ));
    let reconciler = Arc::new(WebhookReconciler::new(
        orchestrator.clone(),
        gateway,
        inventory,
        publisher,
    ));

    let app_state = AppState {
        orchestrator,
        reconciler,
        profiles,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
