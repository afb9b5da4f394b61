use std::sync::Arc;

use tixpay_order::{OrderOrchestrator, ProfileResolver, WebhookReconciler};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<OrderOrchestrator>,
    pub reconciler: Arc<WebhookReconciler>,
    pub profiles: Arc<ProfileResolver>,
    pub auth: AuthConfig,
}
