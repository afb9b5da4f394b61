use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tixpay_order::OrderError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    /// Purchase refused for a reason the caller should see.
    BusinessRuleError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BusinessRuleError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        if err.is_rejection() {
            return AppError::BusinessRuleError(err.to_string());
        }
        match err {
            OrderError::InvalidRequest(msg) => AppError::ValidationError(msg),
            OrderError::Unauthorized => AppError::AuthenticationError("Unauthorized".to_string()),
            OrderError::NotFound(what) => AppError::NotFoundError(format!("Transaction {} not found", what)),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: OrderError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_order_errors_map_to_status_codes() {
        assert_eq!(status_of(OrderError::NotEligible), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(OrderError::UnknownTicket(3)), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_of(OrderError::InsufficientStock { ticket_id: 1, requested: 2, available: 1 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(OrderError::InvalidRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(OrderError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(OrderError::NotFound("1".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(OrderError::collaborator("database", "connection refused".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
