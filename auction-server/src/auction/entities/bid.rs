use {
    crate::kernel::entities::{
        Amount,
        PackageId,
        UserId,
    },
    std::cmp::Ordering,
    time::OffsetDateTime,
};

pub type BidId = String;

#[derive(Clone, Debug, PartialEq)]
pub struct BidCreate {
    pub package_id: PackageId,
    pub user_id:    UserId,
    pub amount:     Amount,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:         BidId,
    pub package_id: PackageId,
    pub user_id:    UserId,
    pub amount:     Amount,
    pub timestamp:  OffsetDateTime,
}

impl Bid {
    pub fn new(bid_create: BidCreate, accepted_at: OffsetDateTime) -> Self {
        Self {
            id:         format!(
                "{}-{}-{}",
                bid_create.package_id,
                bid_create.user_id,
                accepted_at.unix_timestamp_nanos()
            ),
            package_id: bid_create.package_id,
            user_id:    bid_create.user_id,
            amount:     bid_create.amount,
            timestamp:  accepted_at,
        }
    }

    /// Ranking used to pick the winner: a higher amount wins, ties go to the earlier bid.
    pub fn rank(&self, other: &Self) -> Ordering {
        self.amount
            .cmp(&other.amount)
            .then_with(|| other.timestamp.cmp(&self.timestamp))
    }
}

/// Picks the top bid out of a list of bids for one package.
pub fn top_bid<'a>(bids: impl IntoIterator<Item = &'a Bid>) -> Option<&'a Bid> {
    bids.into_iter().max_by(|a, b| a.rank(b))
}
