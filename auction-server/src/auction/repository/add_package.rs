use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    /// Returns `false` if a package with the same id was already stored.
    #[tracing::instrument(skip_all, name = "add_package_repo", fields(package_id = %package.id))]
    pub async fn add_package(&self, package: &entities::Package) -> anyhow::Result<bool> {
        self.db.add_package(package).await
    }
}
