use {
    super::repository::{
        Database,
        Repository,
    },
    crate::publisher::ResultPublisher,
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        sync::Arc,
        time::Duration,
    },
    tokio_util::{
        sync::CancellationToken,
        task::TaskTracker,
    },
};

pub mod add_package;
pub mod close_auction;
pub mod get_bids;
pub mod get_packages;
pub mod place_bid;
pub mod publish_result;
pub mod reconcile_auctions;
pub mod start_auction;
pub mod start_auctions;
pub mod stream_bids;

pub const DEFAULT_AUCTION_DURATION: Duration = Duration::from_secs(120);
pub const DEFAULT_STREAM_POLL_INTERVAL: Duration = Duration::from_secs(2);

fn default_auction_duration() -> Duration {
    DEFAULT_AUCTION_DURATION
}

fn default_stream_poll_interval() -> Duration {
    DEFAULT_STREAM_POLL_INTERVAL
}

fn default_reconcile_on_startup() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// How long bids are collected once an auction starts.
    #[serde(with = "humantime_serde", default = "default_auction_duration")]
    pub duration:             Duration,
    /// How often a bid stream checks the ledger for new bids.
    #[serde(with = "humantime_serde", default = "default_stream_poll_interval")]
    pub stream_poll_interval: Duration,
    /// Re-arm or close auctions left in Auctioning by a previous run.
    #[serde(default = "default_reconcile_on_startup")]
    pub reconcile_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration:             DEFAULT_AUCTION_DURATION,
            stream_poll_interval: DEFAULT_STREAM_POLL_INTERVAL,
            reconcile_on_startup: default_reconcile_on_startup(),
        }
    }
}

pub struct ServiceInner {
    config:       Config,
    repo:         Arc<Repository>,
    publisher:    Arc<dyn ResultPublisher>,
    task_tracker: TaskTracker,
    shutdown:     CancellationToken,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(
        db: impl Database,
        publisher: Arc<dyn ResultPublisher>,
        config: Config,
        task_tracker: TaskTracker,
        shutdown: CancellationToken,
    ) -> Self {
        Self(Arc::new(ServiceInner {
            config,
            repo: Arc::new(Repository::new(db)),
            publisher,
            task_tracker,
            shutdown,
        }))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
pub mod tests {
    use {
        super::*,
        crate::{
            auction::{
                entities,
                repository::InMemoryDatabase,
            },
            kernel::test_utils::DEFAULT_PACKAGE_ID,
            publisher::MockResultPublisher,
        },
        time::OffsetDateTime,
    };

    pub const TEST_AUCTION_DURATION: Duration = Duration::from_secs(60);

    pub fn test_config() -> Config {
        Config {
            duration:             TEST_AUCTION_DURATION,
            stream_poll_interval: Duration::from_millis(100),
            reconcile_on_startup: true,
        }
    }

    pub fn package_with_status(
        package_id: &str,
        status: entities::PackageStatus,
        updated_at: OffsetDateTime,
    ) -> entities::Package {
        entities::Package {
            id: package_id.to_string(),
            status,
            from: "Moscow".to_string(),
            to: "Kazan".to_string(),
            weight: 2.5,
            dimensions: entities::Dimensions {
                length: 30,
                width:  20,
                height: 10,
            },
            cost: 5000,
            currency: "RUB".to_string(),
            tariff_code: "standard".to_string(),
            winner_user_id: None,
            final_cost: None,
            created_at: updated_at,
            updated_at,
        }
    }

    pub fn waiting_package() -> entities::Package {
        package_with_status(
            DEFAULT_PACKAGE_ID,
            entities::PackageStatus::Waiting,
            OffsetDateTime::now_utc(),
        )
    }

    impl Service {
        pub fn new_with_mocks(
            db: impl Database,
            publisher: MockResultPublisher,
            config: Config,
        ) -> Self {
            Self::new(
                db,
                Arc::new(publisher),
                config,
                TaskTracker::new(),
                CancellationToken::new(),
            )
        }

        pub fn new_in_memory(
            db: InMemoryDatabase,
            publisher: MockResultPublisher,
        ) -> Self {
            Self::new_with_mocks(db, publisher, test_config())
        }

        pub fn task_tracker(&self) -> &TaskTracker {
            &self.task_tracker
        }

        pub fn shutdown_token(&self) -> &CancellationToken {
            &self.shutdown
        }
    }

    async fn wait_for_countdowns(service: &Service) {
        service.task_tracker().close();
        service.task_tracker().wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auction_lifecycle_with_winner() {
        use {
            super::{
                place_bid::PlaceBidInput,
                start_auction::StartAuctionInput,
            },
            crate::{
                api::RestError,
                kernel::test_utils::{
                    DEFAULT_USER_ID,
                    OTHER_USER_ID,
                },
            },
        };

        let db = InMemoryDatabase::with_packages(vec![waiting_package()]);
        let mut publisher = MockResultPublisher::new();
        publisher
            .expect_publish_payment()
            .withf(|result| {
                result.package_id == DEFAULT_PACKAGE_ID
                    && result.winner_id == OTHER_USER_ID
                    && result.final_price == 70
            })
            .times(1)
            .returning(|_| Ok(()));
        publisher
            .expect_publish_notification()
            .withf(|note| note.user_id == OTHER_USER_ID)
            .times(1)
            .returning(|_| Ok(()));
        let service = Service::new_in_memory(db.clone(), publisher);

        let package = service
            .start_auction(StartAuctionInput {
                package_id: DEFAULT_PACKAGE_ID.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(package.status, entities::PackageStatus::Auctioning);

        let bid = |user_id: &str, amount| PlaceBidInput {
            bid_create: entities::BidCreate {
                package_id: DEFAULT_PACKAGE_ID.to_string(),
                user_id: user_id.to_string(),
                amount,
            },
        };
        service.place_bid(bid(DEFAULT_USER_ID, 60)).await.unwrap();
        assert!(matches!(
            service.place_bid(bid(OTHER_USER_ID, 50)).await,
            Err(RestError::BidTooLow { top_amount: 60 })
        ));
        service.place_bid(bid(OTHER_USER_ID, 70)).await.unwrap();

        wait_for_countdowns(&service).await;

        let package = db.package(DEFAULT_PACKAGE_ID).unwrap();
        assert_eq!(package.status, entities::PackageStatus::Finished);
        assert_eq!(package.winner_user_id.as_deref(), Some(OTHER_USER_ID));
        assert_eq!(package.final_cost, Some(70));
        assert!(service.repo.get_in_memory_auctions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auction_lifecycle_without_bids() {
        use super::start_auction::StartAuctionInput;

        let db = InMemoryDatabase::with_packages(vec![waiting_package()]);
        let mut publisher = MockResultPublisher::new();
        publisher.expect_publish_payment().never();
        publisher.expect_publish_notification().never();
        let service = Service::new_in_memory(db.clone(), publisher);

        service
            .start_auction(StartAuctionInput {
                package_id: DEFAULT_PACKAGE_ID.to_string(),
            })
            .await
            .unwrap();
        wait_for_countdowns(&service).await;

        assert_eq!(
            db.package(DEFAULT_PACKAGE_ID).unwrap().status,
            entities::PackageStatus::AuctionFailed
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());

        let config: Config =
            serde_yaml::from_str("duration: 1h\nstream_poll_interval: 500ms\nreconcile_on_startup: false\n")
                .unwrap();
        assert_eq!(config.duration, Duration::from_secs(3600));
        assert_eq!(config.stream_poll_interval, Duration::from_millis(500));
        assert!(!config.reconcile_on_startup);
    }
}
