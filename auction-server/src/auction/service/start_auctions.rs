use {
    super::{
        start_auction::StartAuctionInput,
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::PackageId,
    },
    futures::future::join_all,
    time::OffsetDateTime,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StartAuctionsReport {
    pub started: Vec<PackageId>,
    pub skipped: Vec<PackageId>,
}

impl FromIterator<(PackageId, bool)> for StartAuctionsReport {
    fn from_iter<I: IntoIterator<Item = (PackageId, bool)>>(iter: I) -> Self {
        let mut report = StartAuctionsReport::default();
        for (package_id, started) in iter {
            if started {
                report.started.push(package_id);
            } else {
                report.skipped.push(package_id);
            }
        }
        report
    }
}

impl Service {
    async fn try_start_auction(&self, package_id: PackageId) -> (PackageId, bool) {
        let started = match self
            .start_auction(StartAuctionInput {
                package_id: package_id.clone(),
            })
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(package_id = %package_id, error = ?err, "Auction not started");
                false
            }
        };
        (package_id, started)
    }

    async fn relist_and_start_auction(&self, package_id: PackageId) -> (PackageId, bool) {
        match self
            .repo
            .update_package_status(
                &package_id,
                &entities::PackageTransition::Relist,
                OffsetDateTime::now_utc(),
            )
            .await
        {
            Ok(Some(_)) => self.try_start_auction(package_id).await,
            Ok(None) => {
                tracing::info!(package_id = %package_id, "Package is no longer failed, skipping");
                (package_id, false)
            }
            Err(err) => {
                tracing::error!(package_id = %package_id, error = ?err, "Failed to relist package");
                (package_id, false)
            }
        }
    }

    /// Starts an auction for every Waiting package.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn start_waiting_auctions(&self) -> Result<StartAuctionsReport, RestError> {
        let packages = self
            .repo
            .get_packages_by_status(entities::PackageStatus::Waiting)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to get waiting packages");
                RestError::TemporarilyUnavailable
            })?;
        let report: StartAuctionsReport = join_all(
            packages
                .into_iter()
                .map(|package| self.try_start_auction(package.id)),
        )
        .await
        .into_iter()
        .collect();
        tracing::info!(started = report.started.len(), skipped = report.skipped.len(), "Waiting auctions started");
        Ok(report)
    }

    /// Gives every Auction-failed package another auction. The package goes back to Waiting first
    /// so Auctioning is still only ever entered from Waiting.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn repeat_failed_auctions(&self) -> Result<StartAuctionsReport, RestError> {
        let packages = self
            .repo
            .get_packages_by_status(entities::PackageStatus::AuctionFailed)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to get failed packages");
                RestError::TemporarilyUnavailable
            })?;
        let report: StartAuctionsReport = join_all(
            packages
                .into_iter()
                .map(|package| self.relist_and_start_auction(package.id)),
        )
        .await
        .into_iter()
        .collect();
        tracing::info!(started = report.started.len(), skipped = report.skipped.len(), "Failed auctions repeated");
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
                service::tests::package_with_status,
            },
            publisher::MockResultPublisher,
        },
    };

    #[tokio::test]
    async fn test_start_waiting_auctions_only_touches_waiting_packages() {
        let now = OffsetDateTime::now_utc();
        let db = InMemoryDatabase::with_packages(vec![
            package_with_status("pkg-a", entities::PackageStatus::Waiting, now),
            package_with_status("pkg-b", entities::PackageStatus::Waiting, now),
            package_with_status("pkg-c", entities::PackageStatus::Finished, now),
        ]);
        let service = Service::new_in_memory(db.clone(), MockResultPublisher::new());

        let mut report = service.start_waiting_auctions().await.unwrap();
        report.started.sort();
        assert_eq!(report.started, vec!["pkg-a", "pkg-b"]);
        assert!(report.skipped.is_empty());
        assert_eq!(
            db.package("pkg-c").unwrap().status,
            entities::PackageStatus::Finished
        );

        let report = service.start_waiting_auctions().await.unwrap();
        assert_eq!(report, StartAuctionsReport::default());
    }

    #[tokio::test]
    async fn test_repeat_relists_failed_packages_through_waiting() {
        let now = OffsetDateTime::now_utc();
        let db = InMemoryDatabase::with_packages(vec![
            package_with_status("pkg-failed", entities::PackageStatus::AuctionFailed, now),
            package_with_status("pkg-done", entities::PackageStatus::Finished, now),
        ]);
        let service = Service::new_in_memory(db.clone(), MockResultPublisher::new());

        let report = service.repeat_failed_auctions().await.unwrap();
        assert_eq!(report.started, vec!["pkg-failed"]);
        assert_eq!(
            db.package("pkg-failed").unwrap().status,
            entities::PackageStatus::Auctioning
        );
        assert_eq!(
            db.package("pkg-done").unwrap().status,
            entities::PackageStatus::Finished
        );
    }

    #[tokio::test]
    async fn test_store_outage_fails_the_scan() {
        let db = InMemoryDatabase::default();
        db.set_unavailable(true);
        let service = Service::new_in_memory(db, MockResultPublisher::new());
        assert!(matches!(
            service.start_waiting_auctions().await,
            Err(RestError::TemporarilyUnavailable)
        ));
    }
}
