use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

pub struct AddPackageInput {
    pub package: entities::Package,
}

impl Service {
    /// Stores a new package. Returns `false` if the package was already known, in which case the
    /// stored copy is left untouched.
    #[tracing::instrument(skip_all, fields(package_id = %input.package.id), err(level = tracing::Level::TRACE))]
    pub async fn add_package(&self, input: AddPackageInput) -> Result<bool, RestError> {
        if input.package.id.trim().is_empty() {
            return Err(RestError::InvalidPackageId);
        }
        let inserted = self
            .repo
            .add_package(&input.package)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to add package");
                RestError::TemporarilyUnavailable
            })?;
        if !inserted {
            tracing::info!("Package already exists");
        }
        Ok(inserted)
    }
}
