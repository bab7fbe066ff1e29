use {
    super::Repository,
    crate::{
        auction::entities,
        kernel::entities::PackageId,
    },
};

impl Repository {
    pub async fn get_package(
        &self,
        package_id: &PackageId,
    ) -> anyhow::Result<Option<entities::Package>> {
        self.db.get_package(package_id).await
    }
}
