use {
    super::ResultPublisher,
    crate::{
        auction::entities::{
            AuctionResult,
            Notification,
        },
        kernel::broker::Broker,
    },
    axum::async_trait,
    delivery_auction_api_types::event::{
        NotificationEvent,
        PaymentDueEvent,
    },
};

/// Publishes outcome events as JSON onto broker topics.
pub struct BrokerPublisher {
    broker:             Broker,
    payment_topic:      String,
    notification_topic: String,
}

impl BrokerPublisher {
    pub fn new(broker: Broker, payment_topic: String, notification_topic: String) -> Self {
        Self {
            broker,
            payment_topic,
            notification_topic,
        }
    }
}

#[async_trait]
impl ResultPublisher for BrokerPublisher {
    #[tracing::instrument(skip_all, fields(package_id = %result.package_id, topic = %self.payment_topic))]
    async fn publish_payment(&self, result: &AuctionResult) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(&PaymentDueEvent::from(result))?;
        self.broker.publish(
            &self.payment_topic,
            Some(result.package_id.clone()),
            payload,
        )?;
        tracing::info!("Payment event published");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(user_id = %notification.user_id, topic = %self.notification_topic))]
    async fn publish_notification(&self, notification: &Notification) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(&NotificationEvent::from(notification))?;
        self.broker.publish(
            &self.notification_topic,
            Some(notification.user_id.clone()),
            payload,
        )?;
        tracing::info!("Notification event published");
        Ok(())
    }
}
