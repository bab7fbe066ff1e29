use {
    super::Repository,
    crate::{
        auction::entities,
        kernel::entities::PackageId,
    },
    time::OffsetDateTime,
};

impl Repository {
    /// Conditional update relying on the store's atomic compare-and-set.
    /// `None` means the package was not in the status the transition expects.
    #[tracing::instrument(
        skip_all,
        name = "update_package_status_repo",
        fields(package_id = %package_id, new_status = %transition.new_status())
    )]
    pub async fn update_package_status(
        &self,
        package_id: &PackageId,
        transition: &entities::PackageTransition,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<entities::Package>> {
        self.db
            .update_package_status(package_id, transition, updated_at)
            .await
    }
}
