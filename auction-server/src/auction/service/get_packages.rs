use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::UserId,
    },
};

pub struct GetUserWonPackagesInput {
    pub user_id: UserId,
}

impl Service {
    async fn get_packages_by_status(
        &self,
        status: entities::PackageStatus,
    ) -> Result<Vec<entities::Package>, RestError> {
        self.repo
            .get_packages_by_status(status)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, status = %status, "Failed to get packages");
                RestError::TemporarilyUnavailable
            })
    }

    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn get_auctioning_packages(&self) -> Result<Vec<entities::Package>, RestError> {
        self.get_packages_by_status(entities::PackageStatus::Auctioning)
            .await
    }

    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn get_failed_packages(&self) -> Result<Vec<entities::Package>, RestError> {
        self.get_packages_by_status(entities::PackageStatus::AuctionFailed)
            .await
    }

    #[tracing::instrument(skip_all, fields(user_id = %input.user_id), err(level = tracing::Level::TRACE))]
    pub async fn get_user_won_packages(
        &self,
        input: GetUserWonPackagesInput,
    ) -> Result<Vec<entities::Package>, RestError> {
        if input.user_id.trim().is_empty() {
            return Err(RestError::InvalidUserId);
        }
        self.repo
            .get_packages_won_by(&input.user_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to get won packages");
                RestError::TemporarilyUnavailable
            })
    }
}
