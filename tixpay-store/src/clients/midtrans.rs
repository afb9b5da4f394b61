use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use tixpay_core::payment::{
    FraudStatus, GatewayStatus, PaymentGateway, PaymentSession, SessionRequest, TransactionStatus,
};
use tixpay_core::CoreError;

use super::{endpoint, read_json};
use crate::app_config::PaymentConfig;

const SERVICE: &str = "payment gateway";

/// Midtrans Snap (session creation) and Core API (status, cancel).
#[derive(Clone)]
pub struct MidtransGateway {
    http: Client,
    server_key: String,
    snap_url: String,
    core_api_url: String,
}

#[derive(Debug, Serialize)]
struct SnapRequest<'a> {
    transaction_details: TransactionDetails<'a>,
    customer_details: CustomerDetails<'a>,
}

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
    email: &'a str,
    phone: &'a str,
}

impl<'a> From<&'a SessionRequest> for SnapRequest<'a> {
    fn from(request: &'a SessionRequest) -> Self {
        Self {
            transaction_details: TransactionDetails {
                order_id: &request.order_code,
                gross_amount: request.gross_amount,
            },
            customer_details: CustomerDetails {
                first_name: &request.customer_name,
                email: &request.customer_email,
                phone: &request.customer_phone,
            },
        }
    }
}

/// Core API replies 200 with its own `status_code` even for unknown orders.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status_code: String,
    #[serde(default)]
    status_message: String,
    transaction_status: Option<TransactionStatus>,
    fraud_status: Option<FraudStatus>,
}

impl StatusResponse {
    fn into_gateway_status(self, order_code: &str) -> Result<GatewayStatus, CoreError> {
        match self.transaction_status {
            Some(transaction_status) => Ok(GatewayStatus {
                order_id: order_code.to_string(),
                transaction_status,
                fraud_status: self.fraud_status,
            }),
            None => Err(CoreError::UpstreamError {
                service: SERVICE,
                status: self.status_code.parse().unwrap_or(502),
                body: self.status_message,
            }),
        }
    }
}

impl MidtransGateway {
    pub fn new(http: Client, config: &PaymentConfig) -> Self {
        Self {
            http,
            server_key: config.server_key.clone(),
            snap_url: config.snap_url.clone(),
            core_api_url: config.core_api_url.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<PaymentSession, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .post(endpoint(&self.snap_url, &["transactions"])?)
            .basic_auth(&self.server_key, None::<&str>)
            .json(&SnapRequest::from(request))
            .send()
            .await?;
        let session: PaymentSession = read_json(SERVICE, response).await?;
        info!("Payment session opened for {}", request.order_code);
        Ok(session)
    }

    async fn transaction_status(
        &self,
        order_code: &str,
    ) -> Result<GatewayStatus, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .get(endpoint(&self.core_api_url, &[order_code, "status"])?)
            .basic_auth(&self.server_key, None::<&str>)
            .send()
            .await?;
        let status: StatusResponse = read_json(SERVICE, response).await?;
        Ok(status.into_gateway_status(order_code)?)
    }

    async fn cancel(
        &self,
        order_code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .post(endpoint(&self.core_api_url, &[order_code, "cancel"])?)
            .basic_auth(&self.server_key, None::<&str>)
            .send()
            .await?;
        let reply: StatusResponse = read_json(SERVICE, response).await?;
        if !reply.status_code.starts_with('2') {
            return Err(Box::new(CoreError::UpstreamError {
                service: SERVICE,
                status: reply.status_code.parse().unwrap_or(502),
                body: reply.status_message,
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_request_shape() {
        let request = SessionRequest {
            order_code: "ORDER-1".to_string(),
            gross_amount: 3_209_000,
            customer_name: "Alice".to_string(),
            customer_email: "a@example.com".to_string(),
            customer_phone: "0812".to_string(),
        };
        let body = serde_json::to_value(SnapRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "transaction_details": {"order_id": "ORDER-1", "gross_amount": 3209000},
                "customer_details": {"first_name": "Alice", "email": "a@example.com", "phone": "0812"}
            })
        );
    }

    #[test]
    fn test_status_response_maps_to_gateway_status() {
        let json = r#"{"status_code": "200", "transaction_status": "capture", "fraud_status": "accept", "order_id": "ORDER-1"}"#;
        let reply: StatusResponse = serde_json::from_str(json).unwrap();
        let status = reply.into_gateway_status("ORDER-1").unwrap();
        assert_eq!(status.transaction_status, TransactionStatus::Capture);
        assert_eq!(status.fraud_status, Some(FraudStatus::Accept));
    }

    #[test]
    fn test_unknown_transaction_is_upstream_error() {
        let json = r#"{"status_code": "404", "status_message": "Transaction doesn't exist."}"#;
        let reply: StatusResponse = serde_json::from_str(json).unwrap();
        let err = reply.into_gateway_status("ORDER-1").unwrap_err();
        assert!(matches!(err, CoreError::UpstreamError { status: 404, .. }));
    }
}
