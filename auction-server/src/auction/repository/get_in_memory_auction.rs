use {
    super::{
        ActiveAuction,
        Repository,
    },
    crate::kernel::entities::PackageId,
};

impl Repository {
    pub fn get_in_memory_auction(&self, package_id: &PackageId) -> Option<ActiveAuction> {
        self.in_memory_store
            .active_auctions
            .get(package_id)
            .map(|auction| auction.clone())
    }

    pub fn get_in_memory_auctions(&self) -> Vec<ActiveAuction> {
        self.in_memory_store
            .active_auctions
            .iter()
            .map(|auction| auction.value().clone())
            .collect()
    }
}
