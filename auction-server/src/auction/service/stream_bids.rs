use {
    super::Service,
    crate::{
        auction::entities,
        kernel::entities::PackageId,
    },
    futures::Stream,
    std::collections::HashSet,
    tokio::time::MissedTickBehavior,
};

pub struct StreamBidsInput {
    pub package_id: PackageId,
}

impl Service {
    /// Polls the ledger and yields every bid for the package once, in acceptance order.
    ///
    /// The stream never ends on its own. It stops when dropped or when the service shuts down.
    /// Store errors are logged and the next poll tries again.
    pub fn stream_bids(
        &self,
        input: StreamBidsInput,
    ) -> impl Stream<Item = entities::Bid> + Send + 'static {
        let service = self.clone();
        async_stream::stream! {
            let mut seen = HashSet::new();
            let mut interval = tokio::time::interval(service.config.stream_poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = service.shutdown.cancelled() => break,
                    _ = interval.tick() => {}
                }
                match service.repo.get_bids(&input.package_id).await {
                    Ok(bids) => {
                        for bid in bids {
                            if seen.insert(bid.id.clone()) {
                                yield bid;
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = ?err, package_id = %input.package_id, "Failed to poll bids");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::repository::{
                Database,
                InMemoryDatabase,
            },
            kernel::test_utils::{
                DEFAULT_PACKAGE_ID,
                DEFAULT_USER_ID,
                OTHER_USER_ID,
            },
            publisher::MockResultPublisher,
        },
        futures::StreamExt,
        std::time::Duration,
        time::OffsetDateTime,
    };

    fn bid(user_id: &str, amount: i64, offset_secs: u64) -> entities::Bid {
        entities::Bid::new(
            entities::BidCreate {
                package_id: DEFAULT_PACKAGE_ID.to_string(),
                user_id: user_id.to_string(),
                amount,
            },
            OffsetDateTime::UNIX_EPOCH + Duration::from_secs(offset_secs),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_bid_is_emitted_once() {
        let db = InMemoryDatabase::default();
        let service = Service::new_in_memory(db.clone(), MockResultPublisher::new());
        db.add_bid(&bid(DEFAULT_USER_ID, 100, 1)).await.unwrap();

        let stream = service.stream_bids(StreamBidsInput {
            package_id: DEFAULT_PACKAGE_ID.to_string(),
        });
        tokio::pin!(stream);

        assert_eq!(stream.next().await.unwrap().amount, 100);

        db.add_bid(&bid(OTHER_USER_ID, 200, 2)).await.unwrap();
        db.add_bid(&bid(DEFAULT_USER_ID, 300, 3)).await.unwrap();
        assert_eq!(stream.next().await.unwrap().amount, 200);
        assert_eq!(stream.next().await.unwrap().amount, 300);

        // nothing new: the stream keeps polling without re-emitting old bids
        let next = tokio::time::timeout(Duration::from_secs(1), stream.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_survives_store_errors_and_ends_on_shutdown() {
        let db = InMemoryDatabase::default();
        let service = Service::new_in_memory(db.clone(), MockResultPublisher::new());
        db.set_unavailable(true);

        let stream = service.stream_bids(StreamBidsInput {
            package_id: DEFAULT_PACKAGE_ID.to_string(),
        });
        tokio::pin!(stream);

        assert!(tokio::time::timeout(Duration::from_millis(350), stream.next())
            .await
            .is_err());

        db.set_unavailable(false);
        db.add_bid(&bid(DEFAULT_USER_ID, 100, 1)).await.unwrap();
        assert_eq!(stream.next().await.unwrap().amount, 100);

        service.shutdown_token().cancel();
        assert!(stream.next().await.is_none());
    }
}
