use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};

use tixpay_order::reconciler::{extract_order_code, ReconcileOutcome};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/midtrans-notification", post(handle_midtrans_notification))
}

/// POST /midtrans-notification
///
/// The body only identifies the order; status is always re-read from the gateway.
pub async fn handle_midtrans_notification(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let order_code = extract_order_code(&payload)?;
    tracing::info!("Received payment notification for {}", order_code);

    match state.reconciler.handle_notification(&order_code).await? {
        ReconcileOutcome::Applied(status) => {
            tracing::info!("Order {} reconciled to {}", order_code, status);
        }
        ReconcileOutcome::Unchanged => {
            tracing::debug!("Order {} needs no change", order_code);
        }
    }

    Ok(Json(json!({ "status": "ok" })))
}
