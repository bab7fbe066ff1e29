use {
    super::ResultPublisher,
    crate::auction::entities::{
        AuctionResult,
        Notification,
    },
    axum::async_trait,
    axum_prometheus::metrics,
    delivery_auction_api_types::event::{
        NotificationEvent,
        PaymentDueEvent,
    },
    reqwest::Url,
    serde::Serialize,
    std::time::{
        Duration,
        Instant,
    },
};

/// Delivers outcome events by calling the downstream services directly.
pub struct HttpPublisher {
    client:           reqwest::Client,
    payment_url:      Url,
    notification_url: Url,
}

impl HttpPublisher {
    pub fn new(payment_url: &str, notification_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client:           reqwest::Client::builder().timeout(timeout).build()?,
            payment_url:      Url::parse(payment_url)?,
            notification_url: Url::parse(notification_url)?,
        })
    }

    async fn post<T: Serialize>(&self, channel: &str, url: &Url, body: &T) -> anyhow::Result<()> {
        let start = Instant::now();
        let res = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        let result_label = match &res {
            Ok(_) => "success",
            Err(_) => "error",
        };
        let labels = [
            ("channel", channel.to_string()),
            ("result", result_label.to_string()),
        ];
        metrics::counter!("publisher_requests_total", &labels).increment(1);
        metrics::histogram!("publisher_requests_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());
        res?;
        Ok(())
    }
}

#[async_trait]
impl ResultPublisher for HttpPublisher {
    #[tracing::instrument(skip_all, fields(package_id = %result.package_id))]
    async fn publish_payment(&self, result: &AuctionResult) -> anyhow::Result<()> {
        self.post("payment", &self.payment_url, &PaymentDueEvent::from(result))
            .await
    }

    #[tracing::instrument(skip_all, fields(user_id = %notification.user_id))]
    async fn publish_notification(&self, notification: &Notification) -> anyhow::Result<()> {
        self.post(
            "notification",
            &self.notification_url,
            &NotificationEvent::from(notification),
        )
        .await
    }
}
