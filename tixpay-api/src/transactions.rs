use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use tixpay_shared::models::order::{OrderFilter, OrderStatus};
use tixpay_shared::pii::Masked;
use tixpay_shared::PurchaseRequest;

use crate::error::AppError;
use crate::middleware::{customer_auth_middleware, CustomerClaims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateTransactionResponse {
    pub message: String,
    pub order_id: String,
    pub token: String,
    pub redirect_url: String,
    pub discount: i32,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction).get(list_transactions))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{order_code}/cancel", post(cancel_transaction))
        .route_layer(middleware::from_fn_with_state(state, customer_auth_middleware))
}

/// POST /transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<CreateTransactionResponse>), AppError> {
    tracing::info!(
        "Purchase request from {} for {} tickets in {}",
        Masked(&claims.email),
        request.total_ticket,
        request.continent
    );

    let authorization = format!("Bearer {}", bearer.token());
    let caller = state.profiles.resolve(&claims.email, &authorization).await?;
    let created = state.orchestrator.create_transaction(&request, &caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTransactionResponse {
            message: "Transaction created".to_string(),
            order_id: created.order_code,
            token: created.session.token,
            redirect_url: created.session.redirect_url,
            discount: created.discount,
            total: created.total,
        }),
    ))
}

/// GET /transactions?status=
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<OrderStatus>()
                .map_err(|e| AppError::ValidationError(e.to_string()))?,
        ),
        None => None,
    };

    let filter = OrderFilter {
        email: claims.email,
        status,
    };
    let orders = state.orchestrator.list_for_caller(&filter).await?;

    Ok(Json(json!({ "data": orders })))
}

/// GET /transactions/{id}
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let view = state.orchestrator.get_by_id(id, &claims.email).await?;
    Ok(Json(json!({ "data": view })))
}

/// POST /transactions/{order_code}/cancel
///
/// Asks the gateway to cancel; the local status follows from its notification.
pub async fn cancel_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(order_code): Path<String>,
) -> Result<Json<Value>, AppError> {
    let order = state.orchestrator.get_by_order_code(&order_code).await?;
    if order.email != claims.email {
        return Err(AppError::NotFoundError(format!("Transaction {} not found", order_code)));
    }

    state.reconciler.cancel_payment(&order_code).await?;

    Ok(Json(json!({
        "message": "Cancellation requested",
        "order_id": order_code,
    })))
}
