use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::PackageId,
    },
};

pub struct GetBidsInput {
    pub package_id: PackageId,
}

impl Service {
    /// All bids for a package in acceptance order. An unknown package has no bids.
    #[tracing::instrument(skip_all, fields(package_id = %input.package_id), err(level = tracing::Level::TRACE))]
    pub async fn get_bids(&self, input: GetBidsInput) -> Result<Vec<entities::Bid>, RestError> {
        if input.package_id.trim().is_empty() {
            return Err(RestError::InvalidPackageId);
        }
        self.repo.get_bids(&input.package_id).await.map_err(|err| {
            tracing::error!(error = ?err, "Failed to get bids");
            RestError::TemporarilyUnavailable
        })
    }
}
