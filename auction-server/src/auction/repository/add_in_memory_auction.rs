use {
    super::{
        ActiveAuction,
        Repository,
    },
    dashmap::mapref::entry::Entry,
};

impl Repository {
    /// Registers the auction unless one is already active for the package.
    pub fn add_in_memory_auction(&self, auction: ActiveAuction) -> bool {
        match self
            .in_memory_store
            .active_auctions
            .entry(auction.package_id.clone())
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(auction);
                true
            }
        }
    }
}
