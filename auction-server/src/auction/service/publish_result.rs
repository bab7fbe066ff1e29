use {
    super::Service,
    crate::auction::entities,
    axum_prometheus::metrics,
};

pub struct PublishResultInput {
    pub result:       entities::AuctionResult,
    pub notification: entities::Notification,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishReport {
    pub payment_sent:      bool,
    pub notification_sent: bool,
}

impl Service {
    /// Sends the payment and notification events concurrently. A failure on one channel does not
    /// affect the other. Failures are logged and not retried.
    #[tracing::instrument(skip_all, fields(package_id = %input.result.package_id))]
    pub async fn publish_result(&self, input: PublishResultInput) -> PublishReport {
        let (payment, notification) = tokio::join!(
            self.publisher.publish_payment(&input.result),
            self.publisher.publish_notification(&input.notification),
        );

        if let Err(err) = &payment {
            metrics::counter!("publish_failures_total", "channel" => "payment").increment(1);
            tracing::warn!(error = ?err, "Failed to publish payment event");
        }
        if let Err(err) = &notification {
            metrics::counter!("publish_failures_total", "channel" => "notification").increment(1);
            tracing::warn!(
                error = ?err,
                user_id = %input.notification.user_id,
                "Failed to publish notification event"
            );
        }

        PublishReport {
            payment_sent:      payment.is_ok(),
            notification_sent: notification.is_ok(),
        }
    }
}
