use async_trait::async_trait;
use reqwest::Client;

use tixpay_core::inventory::InventoryClient;
use tixpay_shared::models::ticket::{RegionStock, Ticket, TicketEvent};

use super::{endpoint, read_json, Envelope};

#[derive(Clone)]
pub struct TicketServiceClient {
    http: Client,
    base_url: String,
}

impl TicketServiceClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl InventoryClient for TicketServiceClient {
    async fn tickets_by_region(
        &self,
        continent: &str,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["continent", "tickets", continent])?)
            .send()
            .await?;
        let envelope: Envelope<Vec<Ticket>> = read_json("ticket service", response).await?;
        Ok(envelope.data)
    }

    async fn stock_by_region(
        &self,
    ) -> Result<Vec<RegionStock>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["tickets", "continent-stock"])?)
            .send()
            .await?;
        let envelope: Envelope<Vec<RegionStock>> = read_json("ticket service", response).await?;
        Ok(envelope.data)
    }

    async fn ticket_event(
        &self,
        ticket_id: i64,
    ) -> Result<TicketEvent, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["event", "ticket", &ticket_id.to_string()])?)
            .send()
            .await?;
        let envelope: Envelope<TicketEvent> = read_json("ticket service", response).await?;
        Ok(envelope.data)
    }
}
