use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Transaction status as reported by the payment gateway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
    Refund,
    Authorize,
    #[serde(other)]
    Unknown,
}

/// Risk signal that accompanies a `capture`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FraudStatus {
    Accept,
    Challenge,
    Deny,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayStatus {
    pub order_id: String,
    pub transaction_status: TransactionStatus,
    #[serde(default)]
    pub fraud_status: Option<FraudStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub order_code: String,
    pub gross_amount: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

/// Hosted-payment session the customer is redirected to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted payment session for an order
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<PaymentSession, Box<dyn std::error::Error + Send + Sync>>;

    /// Authoritative status lookup; webhook bodies are never trusted for status
    async fn transaction_status(
        &self,
        order_code: &str,
    ) -> Result<GatewayStatus, Box<dyn std::error::Error + Send + Sync>>;

    async fn cancel(
        &self,
        order_code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_status_deserialization() {
        let json = r#"
            {
                "order_id": "ORDER-0000012345",
                "transaction_status": "capture",
                "fraud_status": "challenge",
                "status_code": "201"
            }
        "#;
        let status: GatewayStatus = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(status.transaction_status, TransactionStatus::Capture);
        assert_eq!(status.fraud_status, Some(FraudStatus::Challenge));
    }

    #[test]
    fn test_unrecognised_status_maps_to_unknown() {
        let json = r#"{"order_id": "X", "transaction_status": "partial_refund"}"#;
        let status: GatewayStatus = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(status.transaction_status, TransactionStatus::Unknown);
        assert_eq!(status.fraud_status, None);
    }
}
