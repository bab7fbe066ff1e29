use {
    crate::kernel::entities::PackageId,
    dashmap::DashMap,
    time::OffsetDateTime,
};

mod add_bid;
mod add_in_memory_auction;
mod add_package;
mod get_bids;
mod get_in_memory_auction;
mod get_package;
mod get_packages;
mod get_top_bid;
#[cfg(test)]
mod in_memory_db;
mod models;
mod remove_in_memory_auction;
mod update_in_memory_auction;
mod update_package_status;

#[cfg(test)]
pub use in_memory_db::InMemoryDatabase;
pub use models::*;

/// An auction with an armed countdown in this process.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveAuction {
    pub package_id: PackageId,
    pub started_at: OffsetDateTime,
    pub ends_at:    OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub active_auctions: DashMap<PackageId, ActiveAuction>,
}

#[derive(Debug)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
    pub db:              Box<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
            db:              Box::new(db),
        }
    }
}
