#[cfg(test)]
use mockall::automock;
use {
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
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        sync::Arc,
        time::Duration,
    },
};

mod broker;
mod http;

pub use {
    broker::BrokerPublisher,
    http::HttpPublisher,
};

pub const DEFAULT_PAYMENT_TOPIC: &str = "payments";
pub const DEFAULT_NOTIFICATION_TOPIC: &str = "notifications";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Announces the outcome of a finished auction. Each channel is independent of the other.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResultPublisher: Send + Sync + 'static {
    async fn publish_payment(&self, result: &AuctionResult) -> anyhow::Result<()>;
    async fn publish_notification(&self, notification: &Notification) -> anyhow::Result<()>;
}

impl From<&AuctionResult> for PaymentDueEvent {
    fn from(result: &AuctionResult) -> Self {
        PaymentDueEvent {
            package_id:  result.package_id.clone(),
            winner_id:   result.winner_id.clone(),
            final_price: result.final_price,
            currency:    result.currency.clone(),
            finished_at: result.finished_at,
        }
    }
}

impl From<&Notification> for NotificationEvent {
    fn from(notification: &Notification) -> Self {
        NotificationEvent {
            user_id: notification.user_id.clone(),
            message: notification.message.clone(),
        }
    }
}

fn default_payment_topic() -> String {
    DEFAULT_PAYMENT_TOPIC.to_string()
}

fn default_notification_topic() -> String {
    DEFAULT_NOTIFICATION_TOPIC.to_string()
}

fn default_http_timeout() -> Duration {
    DEFAULT_HTTP_TIMEOUT
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Config {
    /// Publish both events onto broker topics.
    Broker {
        #[serde(default = "default_payment_topic")]
        payment_topic:      String,
        #[serde(default = "default_notification_topic")]
        notification_topic: String,
    },
    /// POST both events directly to the downstream services.
    Http {
        payment_url:      String,
        notification_url: String,
        #[serde(with = "humantime_serde", default = "default_http_timeout")]
        timeout:          Duration,
    },
}

impl Default for Config {
    fn default() -> Self {
        Config::Broker {
            payment_topic:      default_payment_topic(),
            notification_topic: default_notification_topic(),
        }
    }
}

pub fn create_publisher(config: &Config, broker: Broker) -> anyhow::Result<Arc<dyn ResultPublisher>> {
    Ok(match config {
        Config::Broker {
            payment_topic,
            notification_topic,
        } => Arc::new(BrokerPublisher::new(
            broker,
            payment_topic.clone(),
            notification_topic.clone(),
        )),
        Config::Http {
            payment_url,
            notification_url,
            timeout,
        } => Arc::new(HttpPublisher::new(
            payment_url,
            notification_url,
            *timeout,
        )?),
    })
}
