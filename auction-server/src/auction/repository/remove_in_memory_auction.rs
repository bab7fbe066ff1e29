use {
    super::Repository,
    crate::kernel::entities::PackageId,
};

impl Repository {
    pub fn remove_in_memory_auction(&self, package_id: &PackageId) {
        self.in_memory_store.active_auctions.remove(package_id);
    }
}
