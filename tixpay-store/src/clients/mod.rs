//! HTTP collaborators. All of them share one pooled `reqwest::Client`
//! carrying the per-call timeout.

pub mod midtrans;
pub mod rules;
pub mod ticket;
pub mod user;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use tixpay_core::CoreError;

use crate::app_config::{PaymentConfig, ServicesConfig};

pub use midtrans::MidtransGateway;
pub use rules::RulesServiceClient;
pub use ticket::TicketServiceClient;
pub use user::UserServiceClient;

/// `{ "meta": ..., "data": ... }` wrapper used by the internal services.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Box::new(CoreError::UpstreamError {
            service,
            status: status.as_u16(),
            body,
        }));
    }
    Ok(response.json::<T>().await?)
}

pub struct HttpClients {
    pub users: UserServiceClient,
    pub tickets: TicketServiceClient,
    pub rules: RulesServiceClient,
    pub gateway: MidtransGateway,
}

impl HttpClients {
    pub fn new(services: &ServicesConfig, payment: &PaymentConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(services.timeout_seconds))
            .build()?;

        Ok(Self {
            users: UserServiceClient::new(http.clone(), &services.user_service_url),
            tickets: TicketServiceClient::new(http.clone(), &services.ticket_service_url),
            rules: RulesServiceClient::new(http.clone(), &services.rules_service_url),
            gateway: MidtransGateway::new(http, payment),
        })
    }
}

/// Appends path segments to a base URL. Each segment is percent-encoded, so
/// caller-supplied values cannot add segments or a query string.
pub(crate) fn endpoint(
    base: &str,
    segments: &[&str],
) -> Result<reqwest::Url, Box<dyn std::error::Error + Send + Sync>> {
    let mut url = reqwest::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| CoreError::InternalError(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ignores_meta() {
        let json = r#"{"meta": {"code": 200, "message": "ok"}, "data": true}"#;
        let envelope: Envelope<bool> = serde_json::from_str(json).unwrap();
        assert!(envelope.data);
    }

    #[test]
    fn test_endpoint_joins_segments_onto_base_path() {
        let url = endpoint("http://tickets:8082", &["tickets", "continent-stock"]).unwrap();
        assert_eq!(url.as_str(), "http://tickets:8082/tickets/continent-stock");

        let url = endpoint("https://api.sandbox.midtrans.com/v2/", &["ORDER-1", "status"]).unwrap();
        assert_eq!(url.as_str(), "https://api.sandbox.midtrans.com/v2/ORDER-1/status");
    }

    #[test]
    fn test_endpoint_escapes_untrusted_segments() {
        let url = endpoint("http://tickets", &["continent", "tickets", "Asia/../../admin"]).unwrap();
        assert_eq!(url.as_str(), "http://tickets/continent/tickets/Asia%2F..%2F..%2Fadmin");
        assert_eq!(url.path_segments().unwrap().count(), 3);

        let url = endpoint("https://core/v2", &["ORDER-1?foo=bar#x", "cancel"]).unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/v2/ORDER-1%3Ffoo=bar%23x/cancel");
    }

    #[test]
    fn test_endpoint_rejects_non_base_url() {
        assert!(endpoint("mailto:ops@example.com", &["x"]).is_err());
    }
}
