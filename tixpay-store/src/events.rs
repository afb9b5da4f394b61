use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use tixpay_core::publisher::EventPublisher;
use tixpay_shared::models::events::{
    OrderTicketMessage, PdfEmailMessage, TicketStockMessage, TransactionCompletedMessage,
    TransactionCreatedMessage,
};

use crate::app_config::TopicConfig;

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
    topics: TopicConfig,
}

impl EventProducer {
    pub fn new(brokers: &str, topics: TopicConfig) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer, topics })
    }

    pub async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic)
            .key(key)
            .payload(payload);

        match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
            Ok(delivery) => {
                info!("Sent message to {}/{}: partition {} offset {}", topic, key, delivery.partition, delivery.offset);
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send message to {}: {}", topic, e);
                Err(e)
            }
        }
    }

    async fn publish_json<T: Serialize + Sync>(
        &self,
        topic: &str,
        key: &str,
        message: &T,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let payload = serde_json::to_string(message)?;
        self.publish(topic, key, &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for EventProducer {
    async fn order_reserved(
        &self,
        message: &OrderTicketMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let key = message.ticket_id.to_string();
        self.publish_json(&self.topics.order_reservation, &key, message).await
    }

    async fn ticket_sold(
        &self,
        message: &TicketStockMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.publish_json(&self.topics.ticket_sold, &message.order_id, message).await
    }

    async fn ticket_returned(
        &self,
        message: &TicketStockMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.publish_json(&self.topics.ticket_return, &message.order_id, message).await
    }

    async fn pdf_email_requested(
        &self,
        message: &PdfEmailMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.publish_json(&self.topics.send_pdf_email, &message.order_id, message).await
    }

    async fn transaction_created(
        &self,
        message: &TransactionCreatedMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.publish_json(&self.topics.transaction_created, &message.order_id, message).await
    }

    async fn transaction_completed(
        &self,
        message: &TransactionCompletedMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.publish_json(&self.topics.transaction_completed, &message.order_id, message).await
    }
}
