use async_trait::async_trait;
use reqwest::Client;

use tixpay_core::eligibility::{EligibilityClient, EligibilityQuery};

use super::{endpoint, read_json, Envelope};

#[derive(Clone)]
pub struct RulesServiceClient {
    http: Client,
    base_url: String,
}

impl RulesServiceClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl EligibilityClient for RulesServiceClient {
    async fn is_eligible(
        &self,
        query: &EligibilityQuery,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .post(endpoint(&self.base_url, &["check-eligible"])?)
            .json(query)
            .send()
            .await?;
        let envelope: Envelope<bool> = read_json("rules service", response).await?;
        Ok(envelope.data)
    }
}
