use {
    super::Repository,
    crate::{
        auction::entities,
        kernel::entities::UserId,
    },
};

impl Repository {
    pub async fn get_packages_by_status(
        &self,
        status: entities::PackageStatus,
    ) -> anyhow::Result<Vec<entities::Package>> {
        self.db.get_packages_by_status(status).await
    }

    pub async fn get_packages_won_by(
        &self,
        user_id: &UserId,
    ) -> anyhow::Result<Vec<entities::Package>> {
        self.db.get_packages_won_by(user_id).await
    }
}
