use {
    super::Service,
    crate::{
        api::RestError,
        auction::{
            entities,
            repository::ActiveAuction,
        },
        kernel::entities::PackageId,
    },
    axum_prometheus::metrics,
    std::time::Duration,
    time::OffsetDateTime,
};

pub struct StartAuctionInput {
    pub package_id: PackageId,
}

impl Service {
    /// Moves a Waiting package to Auctioning and arms its countdown.
    ///
    /// At most one countdown per package is armed in this process. A second call for a package
    /// that is already being auctioned is rejected instead of re-arming the timer.
    #[tracing::instrument(
        skip_all,
        fields(package_id = %input.package_id),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn start_auction(
        &self,
        input: StartAuctionInput,
    ) -> Result<entities::Package, RestError> {
        let package_id = input.package_id;
        if package_id.trim().is_empty() {
            return Err(RestError::InvalidPackageId);
        }

        let now = OffsetDateTime::now_utc();
        let reserved = self.repo.add_in_memory_auction(ActiveAuction {
            package_id: package_id.clone(),
            started_at: now,
            ends_at:    now + self.config.duration,
        });
        if !reserved {
            if let Some(active) = self.repo.get_in_memory_auction(&package_id) {
                tracing::debug!(ends_at = %active.ends_at, "Countdown already armed");
            }
            return Err(RestError::AuctionAlreadyStarted);
        }

        let package = match self
            .repo
            .update_package_status(&package_id, &entities::PackageTransition::StartAuction, now)
            .await
        {
            Ok(Some(package)) => package,
            Ok(None) => {
                self.repo.remove_in_memory_auction(&package_id);
                return Err(self.get_start_rejection(&package_id).await);
            }
            Err(err) => {
                self.repo.remove_in_memory_auction(&package_id);
                tracing::error!(error = ?err, "Failed to mark package as auctioning");
                return Err(RestError::TemporarilyUnavailable);
            }
        };

        let ends_at = package
            .auction_end(self.config.duration)
            .unwrap_or(now + self.config.duration);
        self.repo.update_in_memory_auction(ActiveAuction {
            package_id: package_id.clone(),
            started_at: package.updated_at,
            ends_at,
        });
        self.arm_countdown(package_id, ends_at);

        metrics::counter!("auction_started_total").increment(1);
        tracing::info!(ends_at = %ends_at, "Auction started");
        Ok(package)
    }

    async fn get_start_rejection(&self, package_id: &PackageId) -> RestError {
        match self.repo.get_package(package_id).await {
            Ok(None) => RestError::PackageNotFound,
            Ok(Some(package)) if package.status == entities::PackageStatus::Auctioning => {
                RestError::AuctionAlreadyStarted
            }
            Ok(Some(package)) => RestError::InvalidPackageStatus(package.status),
            Err(err) => {
                tracing::error!(error = ?err, "Failed to get package");
                RestError::TemporarilyUnavailable
            }
        }
    }

    /// Spawns the countdown for one package on the service task tracker.
    ///
    /// Shutdown stops the wait but never interrupts a close that already began. A package whose
    /// countdown was stopped stays Auctioning until reconciled on the next start.
    pub(super) fn arm_countdown(&self, package_id: PackageId, ends_at: OffsetDateTime) {
        let service = self.clone();
        self.task_tracker.spawn(async move {
            let remaining =
                Duration::try_from(ends_at - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO);
            tokio::select! {
                biased;
                _ = service.shutdown.cancelled() => {
                    tracing::info!(package_id = %package_id, "Shutting down countdown, auction left active");
                    service.repo.remove_in_memory_auction(&package_id);
                    return;
                }
                _ = tokio::time::sleep(remaining) => {}
            }

            // The slot must be free before the terminal status becomes visible.
            service.repo.remove_in_memory_auction(&package_id);
            if let Err(err) = service
                .close_auction(super::close_auction::CloseAuctionInput {
                    package_id: package_id.clone(),
                })
                .await
            {
                tracing::error!(error = ?err, package_id = %package_id, "Failed to close auction");
            }
        });
    }
}
