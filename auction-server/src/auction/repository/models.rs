#[cfg(test)]
use mockall::automock;
use {
    crate::{
        auction::entities,
        kernel::{
            db::DB,
            entities::{
                PackageId,
                UserId,
            },
        },
    },
    axum::async_trait,
    sqlx::FromRow,
    std::fmt::Debug,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
        UtcOffset,
    },
    tracing::instrument,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "package_status", rename_all = "snake_case")]
pub enum PackageStatus {
    Waiting,
    Auctioning,
    Finished,
    AuctionFailed,
}

impl From<entities::PackageStatus> for PackageStatus {
    fn from(status: entities::PackageStatus) -> Self {
        match status {
            entities::PackageStatus::Waiting => PackageStatus::Waiting,
            entities::PackageStatus::Auctioning => PackageStatus::Auctioning,
            entities::PackageStatus::Finished => PackageStatus::Finished,
            entities::PackageStatus::AuctionFailed => PackageStatus::AuctionFailed,
        }
    }
}

impl From<PackageStatus> for entities::PackageStatus {
    fn from(status: PackageStatus) -> Self {
        match status {
            PackageStatus::Waiting => entities::PackageStatus::Waiting,
            PackageStatus::Auctioning => entities::PackageStatus::Auctioning,
            PackageStatus::Finished => entities::PackageStatus::Finished,
            PackageStatus::AuctionFailed => entities::PackageStatus::AuctionFailed,
        }
    }
}

fn to_primitive(time: OffsetDateTime) -> PrimitiveDateTime {
    let time = time.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(time.date(), time.time())
}

#[derive(Clone, FromRow, Debug)]
pub struct Package {
    pub id:             String,
    pub status:         PackageStatus,
    pub from_location:  String,
    pub to_location:    String,
    pub weight:         f64,
    pub length:         i32,
    pub width:          i32,
    pub height:         i32,
    pub cost:           i64,
    pub currency:       String,
    pub tariff_code:    String,
    pub winner_user_id: Option<String>,
    pub final_cost:     Option<i64>,
    pub creation_time:  PrimitiveDateTime,
    pub update_time:    PrimitiveDateTime,
}

impl Package {
    pub fn get_package_entity(&self) -> entities::Package {
        entities::Package {
            id:             self.id.clone(),
            status:         self.status.into(),
            from:           self.from_location.clone(),
            to:             self.to_location.clone(),
            weight:         self.weight,
            dimensions:     entities::Dimensions {
                length: self.length,
                width:  self.width,
                height: self.height,
            },
            cost:           self.cost,
            currency:       self.currency.clone(),
            tariff_code:    self.tariff_code.clone(),
            winner_user_id: self.winner_user_id.clone(),
            final_cost:     self.final_cost,
            created_at:     self.creation_time.assume_utc(),
            updated_at:     self.update_time.assume_utc(),
        }
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct Bid {
    pub id:            String,
    pub seq:           i64,
    pub package_id:    String,
    pub user_id:       String,
    pub amount:        i64,
    pub creation_time: PrimitiveDateTime,
}

impl Bid {
    pub fn get_bid_entity(&self) -> entities::Bid {
        entities::Bid {
            id:         self.id.clone(),
            package_id: self.package_id.clone(),
            user_id:    self.user_id.clone(),
            amount:     self.amount,
            timestamp:  self.creation_time.assume_utc(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    /// Inserts the package unless one with the same id exists. Returns whether it was inserted.
    async fn add_package(&self, package: &entities::Package) -> anyhow::Result<bool>;
    async fn get_package(&self, package_id: &PackageId)
        -> anyhow::Result<Option<entities::Package>>;
    async fn get_packages_by_status(
        &self,
        status: entities::PackageStatus,
    ) -> anyhow::Result<Vec<entities::Package>>;
    async fn get_packages_won_by(&self, user_id: &UserId)
        -> anyhow::Result<Vec<entities::Package>>;
    /// Applies the transition only if the package is still in the expected status.
    /// Returns the updated package, or `None` if nothing matched.
    async fn update_package_status(
        &self,
        package_id: &PackageId,
        transition: &entities::PackageTransition,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<entities::Package>>;
    async fn add_bid(&self, bid: &entities::Bid) -> anyhow::Result<()>;
    async fn get_top_bid(&self, package_id: &PackageId) -> anyhow::Result<Option<entities::Bid>>;
    async fn get_bids(&self, package_id: &PackageId) -> anyhow::Result<Vec<entities::Bid>>;
}

#[async_trait]
impl Database for DB {
    #[instrument(
        target = "metrics",
        name = "db_add_package",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_package",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_package(&self, package: &entities::Package) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO package (id, status, from_location, to_location, weight, length, width, height, cost, currency, tariff_code, creation_time, update_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&package.id)
        .bind(PackageStatus::from(package.status))
        .bind(&package.from)
        .bind(&package.to)
        .bind(package.weight)
        .bind(package.dimensions.length)
        .bind(package.dimensions.width)
        .bind(package.dimensions.height)
        .bind(package.cost)
        .bind(&package.currency)
        .bind(&package.tariff_code)
        .bind(to_primitive(package.created_at))
        .bind(to_primitive(package.updated_at))
        .execute(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(
        target = "metrics",
        name = "db_get_package",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_package",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_package(
        &self,
        package_id: &PackageId,
    ) -> anyhow::Result<Option<entities::Package>> {
        let package: Option<Package> = sqlx::query_as("SELECT * FROM package WHERE id = $1")
            .bind(package_id)
            .fetch_optional(self)
            .await
            .inspect_err(|_| {
                tracing::Span::current().record("result", "error");
            })?;
        Ok(package.map(|p| p.get_package_entity()))
    }

    #[instrument(
        target = "metrics",
        name = "db_get_packages_by_status",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_packages_by_status",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_packages_by_status(
        &self,
        status: entities::PackageStatus,
    ) -> anyhow::Result<Vec<entities::Package>> {
        let packages: Vec<Package> =
            sqlx::query_as("SELECT * FROM package WHERE status = $1 ORDER BY update_time ASC")
                .bind(PackageStatus::from(status))
                .fetch_all(self)
                .await
                .inspect_err(|_| {
                    tracing::Span::current().record("result", "error");
                })?;
        Ok(packages.iter().map(Package::get_package_entity).collect())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_packages_won_by",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_packages_won_by",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_packages_won_by(
        &self,
        user_id: &UserId,
    ) -> anyhow::Result<Vec<entities::Package>> {
        let packages: Vec<Package> = sqlx::query_as(
            "SELECT * FROM package WHERE status = $1 AND winner_user_id = $2 ORDER BY update_time DESC",
        )
        .bind(PackageStatus::Finished)
        .bind(user_id)
        .fetch_all(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(packages.iter().map(Package::get_package_entity).collect())
    }

    #[instrument(
        target = "metrics",
        name = "db_update_package_status",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_package_status",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_package_status(
        &self,
        package_id: &PackageId,
        transition: &entities::PackageTransition,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<entities::Package>> {
        let (winner_user_id, final_cost) = match transition {
            entities::PackageTransition::Finish {
                winner_user_id,
                final_cost,
            } => (Some(winner_user_id.clone()), Some(*final_cost)),
            _ => (None, None),
        };
        let package: Option<Package> = sqlx::query_as(
            "UPDATE package SET status = $1, update_time = GREATEST(update_time, $2), \
             winner_user_id = COALESCE($3, winner_user_id), final_cost = COALESCE($4, final_cost) \
             WHERE id = $5 AND status = $6 RETURNING *",
        )
        .bind(PackageStatus::from(transition.new_status()))
        .bind(to_primitive(updated_at))
        .bind(winner_user_id)
        .bind(final_cost)
        .bind(package_id)
        .bind(PackageStatus::from(transition.expected_status()))
        .fetch_optional(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(package.map(|p| p.get_package_entity()))
    }

    #[instrument(
        target = "metrics",
        name = "db_add_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_bid(&self, bid: &entities::Bid) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO bid (id, package_id, user_id, amount, creation_time) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&bid.id)
        .bind(&bid.package_id)
        .bind(&bid.user_id)
        .bind(bid.amount)
        .bind(to_primitive(bid.timestamp))
        .execute(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_top_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_top_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_top_bid(&self, package_id: &PackageId) -> anyhow::Result<Option<entities::Bid>> {
        let bid: Option<Bid> = sqlx::query_as(
            "SELECT * FROM bid WHERE package_id = $1 ORDER BY amount DESC, creation_time ASC, seq ASC LIMIT 1",
        )
        .bind(package_id)
        .fetch_optional(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(bid.map(|b| b.get_bid_entity()))
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bids",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bids",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bids(&self, package_id: &PackageId) -> anyhow::Result<Vec<entities::Bid>> {
        let bids: Vec<Bid> =
            sqlx::query_as("SELECT * FROM bid WHERE package_id = $1 ORDER BY seq ASC")
                .bind(package_id)
                .fetch_all(self)
                .await
                .inspect_err(|_| {
                    tracing::Span::current().record("result", "error");
                })?;
        Ok(bids.iter().map(Bid::get_bid_entity).collect())
    }
}
