use {
    super::Service,
    crate::{
        api::{
            InactiveReason,
            RestError,
        },
        auction::entities,
    },
    axum_prometheus::metrics,
    time::OffsetDateTime,
};

pub struct PlaceBidInput {
    pub bid_create: entities::BidCreate,
}

impl Service {
    async fn verify_bid(
        &self,
        bid_create: &entities::BidCreate,
        now: OffsetDateTime,
    ) -> Result<(), RestError> {
        if bid_create.package_id.trim().is_empty() {
            return Err(RestError::InvalidPackageId);
        }
        if bid_create.user_id.trim().is_empty() {
            return Err(RestError::InvalidUserId);
        }
        if bid_create.amount <= 0 {
            return Err(RestError::InvalidAmount);
        }

        let package = self
            .repo
            .get_package(&bid_create.package_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to get package");
                RestError::TemporarilyUnavailable
            })?
            .ok_or(RestError::PackageNotFound)?;
        if package.status != entities::PackageStatus::Auctioning {
            return Err(RestError::AuctionNotActive(InactiveReason::NotAuctioning));
        }
        // The countdown may not have fired yet, the deadline alone decides.
        match package.auction_end(self.config.duration) {
            Some(ends_at) if now <= ends_at => {}
            _ => return Err(RestError::AuctionNotActive(InactiveReason::Ended)),
        }

        let top_bid = self
            .repo
            .get_top_bid(&bid_create.package_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to get top bid");
                RestError::TemporarilyUnavailable
            })?;
        match top_bid {
            Some(top_bid) if bid_create.amount <= top_bid.amount => Err(RestError::BidTooLow {
                top_amount: top_bid.amount,
            }),
            _ => Ok(()),
        }
    }

    /// Validates a bid against the package state and the current top bid, then records it.
    ///
    /// The top-bid check is advisory: two bids racing on the same package can both pass it.
    #[tracing::instrument(
        skip_all,
        fields(
            package_id = %input.bid_create.package_id,
            user_id = %input.bid_create.user_id,
            amount = input.bid_create.amount,
            bid_id
        ),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn place_bid(&self, input: PlaceBidInput) -> Result<entities::Bid, RestError> {
        let now = OffsetDateTime::now_utc();
        let result = match self.verify_bid(&input.bid_create, now).await {
            Ok(()) => {
                let bid = entities::Bid::new(input.bid_create, now);
                tracing::Span::current().record("bid_id", bid.id.as_str());
                self.repo
                    .add_bid(&bid)
                    .await
                    .map(|_| bid)
                    .map_err(|err| {
                        tracing::error!(error = ?err, "Failed to save bid");
                        RestError::SaveBidFailed
                    })
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(_) => metrics::counter!("bids_placed_total").increment(1),
            Err(err) => {
                metrics::counter!("bid_rejected_total", "reason" => err.as_ref().to_string())
                    .increment(1)
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::{
                repository::{
                    InMemoryDatabase,
                    MockDatabase,
                },
                service::tests::{
                    package_with_status,
                    test_config,
                    TEST_AUCTION_DURATION,
                },
            },
            kernel::test_utils::{
                DEFAULT_PACKAGE_ID,
                DEFAULT_USER_ID,
                OTHER_USER_ID,
            },
            publisher::MockResultPublisher,
        },
        anyhow::anyhow,
    };

    fn bid_input(user_id: &str, amount: i64) -> PlaceBidInput {
        PlaceBidInput {
            bid_create: entities::BidCreate {
                package_id: DEFAULT_PACKAGE_ID.to_string(),
                user_id: user_id.to_string(),
                amount,
            },
        }
    }

    fn service_with_package(status: entities::PackageStatus, started_at: OffsetDateTime) -> (Service, InMemoryDatabase) {
        let db = InMemoryDatabase::with_packages(vec![package_with_status(
            DEFAULT_PACKAGE_ID,
            status,
            started_at,
        )]);
        (
            Service::new_in_memory(db.clone(), MockResultPublisher::new()),
            db,
        )
    }

    #[tokio::test]
    async fn test_bids_must_strictly_increase() {
        let (service, db) = service_with_package(
            entities::PackageStatus::Auctioning,
            OffsetDateTime::now_utc(),
        );

        let first = service.place_bid(bid_input(DEFAULT_USER_ID, 6000)).await.unwrap();
        assert_eq!(first.amount, 6000);
        assert!(first.id.starts_with("pkg-1-user-1-"));

        assert!(matches!(
            service.place_bid(bid_input(OTHER_USER_ID, 5000)).await,
            Err(RestError::BidTooLow { top_amount: 6000 })
        ));
        assert!(matches!(
            service.place_bid(bid_input(OTHER_USER_ID, 6000)).await,
            Err(RestError::BidTooLow { top_amount: 6000 })
        ));
        service.place_bid(bid_input(OTHER_USER_ID, 7000)).await.unwrap();
        // a user may raise their own bid
        service.place_bid(bid_input(OTHER_USER_ID, 7500)).await.unwrap();

        let amounts: Vec<_> = db.bids().iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![6000, 7000, 7500]);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_store_access() {
        let mut db = MockDatabase::default();
        db.expect_get_package().never();
        let service = Service::new_with_mocks(db, MockResultPublisher::new(), test_config());

        let mut input = bid_input(DEFAULT_USER_ID, 100);
        input.bid_create.package_id = String::new();
        assert!(matches!(
            service.place_bid(input).await,
            Err(RestError::InvalidPackageId)
        ));
        assert!(matches!(
            service.place_bid(bid_input("", 100)).await,
            Err(RestError::InvalidUserId)
        ));
        assert!(matches!(
            service.place_bid(bid_input(DEFAULT_USER_ID, 0)).await,
            Err(RestError::InvalidAmount)
        ));
        assert!(matches!(
            service.place_bid(bid_input(DEFAULT_USER_ID, -5)).await,
            Err(RestError::InvalidAmount)
        ));
    }

    #[tokio::test]
    async fn test_unknown_package() {
        let service = Service::new_in_memory(InMemoryDatabase::default(), MockResultPublisher::new());
        assert!(matches!(
            service.place_bid(bid_input(DEFAULT_USER_ID, 100)).await,
            Err(RestError::PackageNotFound)
        ));
    }

    #[tokio::test]
    async fn test_bid_on_package_not_auctioning() {
        for status in [
            entities::PackageStatus::Waiting,
            entities::PackageStatus::Finished,
            entities::PackageStatus::AuctionFailed,
        ] {
            let (service, _) = service_with_package(status, OffsetDateTime::now_utc());
            assert!(matches!(
                service.place_bid(bid_input(DEFAULT_USER_ID, 100)).await,
                Err(RestError::AuctionNotActive(InactiveReason::NotAuctioning))
            ));
        }
    }

    #[tokio::test]
    async fn test_bid_after_deadline_is_rejected_before_close() {
        let started_at = OffsetDateTime::now_utc() - TEST_AUCTION_DURATION - time::Duration::seconds(1);
        let (service, db) = service_with_package(entities::PackageStatus::Auctioning, started_at);

        assert!(matches!(
            service.place_bid(bid_input(DEFAULT_USER_ID, 100)).await,
            Err(RestError::AuctionNotActive(InactiveReason::Ended))
        ));
        assert!(db.bids().is_empty());
        assert_eq!(
            db.package(DEFAULT_PACKAGE_ID).unwrap().status,
            entities::PackageStatus::Auctioning
        );
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let started_at = OffsetDateTime::now_utc();
        let mut db = MockDatabase::default();
        db.expect_get_package().returning(move |_| {
            Ok(Some(package_with_status(
                DEFAULT_PACKAGE_ID,
                entities::PackageStatus::Auctioning,
                started_at,
            )))
        });
        db.expect_get_top_bid().returning(|_| Ok(None));
        db.expect_add_bid()
            .times(1)
            .returning(|_| Err(anyhow!("write conflict")));
        let service = Service::new_with_mocks(db, MockResultPublisher::new(), test_config());

        assert!(matches!(
            service.place_bid(bid_input(DEFAULT_USER_ID, 100)).await,
            Err(RestError::SaveBidFailed)
        ));
    }

    #[tokio::test]
    async fn test_store_outage_is_temporary() {
        let (service, db) = service_with_package(
            entities::PackageStatus::Auctioning,
            OffsetDateTime::now_utc(),
        );
        db.set_unavailable(true);
        assert!(matches!(
            service.place_bid(bid_input(DEFAULT_USER_ID, 100)).await,
            Err(RestError::TemporarilyUnavailable)
        ));
    }
}
