use {
    super::Repository,
    crate::{
        auction::entities,
        kernel::entities::PackageId,
    },
};

impl Repository {
    /// Bids in acceptance order.
    pub async fn get_bids(&self, package_id: &PackageId) -> anyhow::Result<Vec<entities::Bid>> {
        self.db.get_bids(package_id).await
    }
}
