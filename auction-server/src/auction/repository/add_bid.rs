use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    #[tracing::instrument(skip_all, name = "add_bid_repo", fields(bid_id = %bid.id))]
    pub async fn add_bid(&self, bid: &entities::Bid) -> anyhow::Result<()> {
        self.db.add_bid(bid).await
    }
}
