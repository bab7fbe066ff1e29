use {
    super::{
        close_auction::CloseAuctionInput,
        Service,
    },
    crate::auction::{
        entities,
        repository::ActiveAuction,
    },
    time::OffsetDateTime,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub rearmed: usize,
    pub closed:  usize,
}

impl Service {
    /// Picks up auctions left in Auctioning by a previous run. Expired ones are closed right away,
    /// the rest get a countdown for the time they have left.
    #[tracing::instrument(skip_all)]
    pub async fn reconcile_auctions(&self) -> anyhow::Result<ReconcileReport> {
        let packages = self
            .repo
            .get_packages_by_status(entities::PackageStatus::Auctioning)
            .await?;
        let now = OffsetDateTime::now_utc();
        let mut report = ReconcileReport::default();

        for package in packages {
            let Some(ends_at) = package.auction_end(self.config.duration) else {
                continue;
            };
            if ends_at <= now {
                match self
                    .close_auction(CloseAuctionInput {
                        package_id: package.id.clone(),
                    })
                    .await
                {
                    Ok(_) => report.closed += 1,
                    Err(err) => {
                        tracing::error!(error = ?err, package_id = %package.id, "Failed to close expired auction")
                    }
                }
                continue;
            }

            let reserved = self.repo.add_in_memory_auction(ActiveAuction {
                package_id: package.id.clone(),
                started_at: package.updated_at,
                ends_at,
            });
            if reserved {
                self.arm_countdown(package.id, ends_at);
                report.rearmed += 1;
            }
        }

        tracing::info!(rearmed = report.rearmed, closed = report.closed, "Auctions reconciled");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            auction::{
                repository::InMemoryDatabase,
                service::tests::{
                    package_with_status,
                    TEST_AUCTION_DURATION,
                },
            },
            publisher::MockResultPublisher,
        },
        std::time::Duration,
    };

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_closes_expired_and_rearms_running() {
        let now = OffsetDateTime::now_utc();
        let expired_at = now - TEST_AUCTION_DURATION - Duration::from_secs(5);
        let db = InMemoryDatabase::with_packages(vec![
            package_with_status("pkg-expired", entities::PackageStatus::Auctioning, expired_at),
            package_with_status("pkg-running", entities::PackageStatus::Auctioning, now),
            package_with_status("pkg-waiting", entities::PackageStatus::Waiting, now),
        ]);
        let service = Service::new_in_memory(db.clone(), MockResultPublisher::new());

        let report = service.reconcile_auctions().await.unwrap();
        assert_eq!(
            report,
            ReconcileReport {
                rearmed: 1,
                closed:  1,
            }
        );
        assert_eq!(
            db.package("pkg-expired").unwrap().status,
            entities::PackageStatus::AuctionFailed
        );
        assert_eq!(
            db.package("pkg-running").unwrap().status,
            entities::PackageStatus::Auctioning
        );
        assert!(service
            .repo
            .get_in_memory_auction(&"pkg-running".to_string())
            .is_some());

        // a replay neither re-arms nor closes twice
        let report = service.reconcile_auctions().await.unwrap();
        assert_eq!(report, ReconcileReport::default());

        service.task_tracker().close();
        service.task_tracker().wait().await;
        assert_eq!(
            db.package("pkg-running").unwrap().status,
            entities::PackageStatus::AuctionFailed
        );
    }
}
