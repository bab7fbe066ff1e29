use {
    super::Database,
    crate::{
        auction::entities,
        kernel::entities::{
            PackageId,
            UserId,
        },
    },
    anyhow::anyhow,
    axum::async_trait,
    std::{
        collections::HashMap,
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
            Mutex,
        },
    },
    time::OffsetDateTime,
};

#[derive(Debug, Default)]
struct State {
    packages:    Mutex<HashMap<PackageId, entities::Package>>,
    bids:        Mutex<Vec<entities::Bid>>,
    unavailable: AtomicBool,
}

/// A store with the same conditional-update semantics as the postgres one, for tests.
/// Clones share the same state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDatabase {
    state: Arc<State>,
}

impl InMemoryDatabase {
    pub fn with_packages(packages: Vec<entities::Package>) -> Self {
        let db = Self::default();
        db.state
            .packages
            .lock()
            .unwrap()
            .extend(packages.into_iter().map(|p| (p.id.clone(), p)));
        db
    }

    /// Makes every call fail until reset, like an unreachable store.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn package(&self, package_id: &str) -> Option<entities::Package> {
        self.state.packages.lock().unwrap().get(package_id).cloned()
    }

    pub fn bids(&self) -> Vec<entities::Bid> {
        self.state.bids.lock().unwrap().clone()
    }

    fn check_available(&self) -> anyhow::Result<()> {
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("store unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn add_package(&self, package: &entities::Package) -> anyhow::Result<bool> {
        self.check_available()?;
        let mut packages = self.state.packages.lock().unwrap();
        if packages.contains_key(&package.id) {
            return Ok(false);
        }
        packages.insert(package.id.clone(), package.clone());
        Ok(true)
    }

    async fn get_package(
        &self,
        package_id: &PackageId,
    ) -> anyhow::Result<Option<entities::Package>> {
        self.check_available()?;
        Ok(self.package(package_id))
    }

    async fn get_packages_by_status(
        &self,
        status: entities::PackageStatus,
    ) -> anyhow::Result<Vec<entities::Package>> {
        self.check_available()?;
        let mut packages: Vec<_> = self
            .state
            .packages
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        packages.sort_by_key(|p| p.updated_at);
        Ok(packages)
    }

    async fn get_packages_won_by(
        &self,
        user_id: &UserId,
    ) -> anyhow::Result<Vec<entities::Package>> {
        self.check_available()?;
        let mut packages: Vec<_> = self
            .state
            .packages
            .lock()
            .unwrap()
            .values()
            .filter(|p| {
                p.status == entities::PackageStatus::Finished
                    && p.winner_user_id.as_ref() == Some(user_id)
            })
            .cloned()
            .collect();
        packages.sort_by_key(|p| std::cmp::Reverse(p.updated_at));
        Ok(packages)
    }

    async fn update_package_status(
        &self,
        package_id: &PackageId,
        transition: &entities::PackageTransition,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<entities::Package>> {
        self.check_available()?;
        let mut packages = self.state.packages.lock().unwrap();
        Ok(packages.get_mut(package_id).and_then(|package| {
            transition
                .apply(package, updated_at)
                .then(|| package.clone())
        }))
    }

    async fn add_bid(&self, bid: &entities::Bid) -> anyhow::Result<()> {
        self.check_available()?;
        self.state.bids.lock().unwrap().push(bid.clone());
        Ok(())
    }

    async fn get_top_bid(&self, package_id: &PackageId) -> anyhow::Result<Option<entities::Bid>> {
        self.check_available()?;
        let bids = self.state.bids.lock().unwrap();
        Ok(entities::top_bid(bids.iter().filter(|b| &b.package_id == package_id)).cloned())
    }

    async fn get_bids(&self, package_id: &PackageId) -> anyhow::Result<Vec<entities::Bid>> {
        self.check_available()?;
        Ok(self
            .state
            .bids
            .lock()
            .unwrap()
            .iter()
            .filter(|b| &b.package_id == package_id)
            .cloned()
            .collect())
    }
}
