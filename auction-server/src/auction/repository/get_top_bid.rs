use {
    super::Repository,
    crate::{
        auction::entities,
        kernel::entities::PackageId,
    },
};

impl Repository {
    pub async fn get_top_bid(
        &self,
        package_id: &PackageId,
    ) -> anyhow::Result<Option<entities::Bid>> {
        self.db.get_top_bid(package_id).await
    }
}
