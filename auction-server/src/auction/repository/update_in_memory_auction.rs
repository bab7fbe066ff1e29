use super::{
    ActiveAuction,
    Repository,
};

impl Repository {
    pub fn update_in_memory_auction(&self, auction: ActiveAuction) {
        self.in_memory_store
            .active_auctions
            .insert(auction.package_id.clone(), auction);
    }
}
