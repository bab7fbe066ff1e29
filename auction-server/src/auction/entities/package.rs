use {
    crate::kernel::entities::{
        Amount,
        Currency,
        PackageId,
        UserId,
    },
    std::{
        fmt::{
            Display,
            Formatter,
        },
        time::Duration,
    },
    time::OffsetDateTime,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackageStatus {
    Waiting,
    Auctioning,
    Finished,
    AuctionFailed,
}

impl Display for PackageStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageStatus::Waiting => write!(f, "Waiting"),
            PackageStatus::Auctioning => write!(f, "Auctioning"),
            PackageStatus::Finished => write!(f, "Finished"),
            PackageStatus::AuctionFailed => write!(f, "Auction-failed"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Dimensions {
    pub length: i32,
    pub width:  i32,
    pub height: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    pub id:             PackageId,
    pub status:         PackageStatus,
    pub from:           String,
    pub to:             String,
    pub weight:         f64,
    pub dimensions:     Dimensions,
    pub cost:           Amount,
    pub currency:       Currency,
    pub tariff_code:    String,
    pub winner_user_id: Option<UserId>,
    pub final_cost:     Option<Amount>,
    pub created_at:     OffsetDateTime,
    pub updated_at:     OffsetDateTime,
}

impl Package {
    /// While auctioning, `updated_at` is the time the auction started.
    pub fn auction_end(&self, auction_duration: Duration) -> Option<OffsetDateTime> {
        match self.status {
            PackageStatus::Auctioning => Some(self.updated_at + auction_duration),
            _ => None,
        }
    }
}

/// A conditional status change: applied only if the package is still in `expected_status`.
#[derive(Clone, Debug, PartialEq)]
pub enum PackageTransition {
    StartAuction,
    Finish {
        winner_user_id: UserId,
        final_cost:     Amount,
    },
    Fail,
    Relist,
}

impl PackageTransition {
    pub fn expected_status(&self) -> PackageStatus {
        match self {
            PackageTransition::StartAuction => PackageStatus::Waiting,
            PackageTransition::Finish { .. } => PackageStatus::Auctioning,
            PackageTransition::Fail => PackageStatus::Auctioning,
            PackageTransition::Relist => PackageStatus::AuctionFailed,
        }
    }

    pub fn new_status(&self) -> PackageStatus {
        match self {
            PackageTransition::StartAuction => PackageStatus::Auctioning,
            PackageTransition::Finish { .. } => PackageStatus::Finished,
            PackageTransition::Fail => PackageStatus::AuctionFailed,
            PackageTransition::Relist => PackageStatus::Waiting,
        }
    }

    /// Applies the transition to an in-memory copy, returning `false` if the status does not match.
    pub fn apply(&self, package: &mut Package, updated_at: OffsetDateTime) -> bool {
        if package.status != self.expected_status() {
            return false;
        }
        package.status = self.new_status();
        package.updated_at = updated_at.max(package.updated_at);
        if let PackageTransition::Finish {
            winner_user_id,
            final_cost,
        } = self
        {
            package.winner_user_id = Some(winner_user_id.clone());
            package.final_cost = Some(*final_cost);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(status: PackageStatus) -> Package {
        Package {
            id: "pkg-1".to_string(),
            status,
            from: "Moscow".to_string(),
            to: "Kazan".to_string(),
            weight: 1.0,
            dimensions: Dimensions::default(),
            cost: 5000,
            currency: "RUB".to_string(),
            tariff_code: "standard".to_string(),
            winner_user_id: None,
            final_cost: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_auction_end_only_while_auctioning() {
        let duration = Duration::from_secs(120);
        assert_eq!(
            package(PackageStatus::Auctioning).auction_end(duration),
            Some(OffsetDateTime::UNIX_EPOCH + duration)
        );
        assert_eq!(package(PackageStatus::Waiting).auction_end(duration), None);
        assert_eq!(package(PackageStatus::Finished).auction_end(duration), None);
    }

    #[test]
    fn test_finish_sets_winner_and_cost() {
        let mut package = package(PackageStatus::Auctioning);
        let now = OffsetDateTime::UNIX_EPOCH + Duration::from_secs(10);
        let transition = PackageTransition::Finish {
            winner_user_id: "user-2".to_string(),
            final_cost:     7000,
        };
        assert!(transition.apply(&mut package, now));
        assert_eq!(package.status, PackageStatus::Finished);
        assert_eq!(package.winner_user_id.as_deref(), Some("user-2"));
        assert_eq!(package.final_cost, Some(7000));
        assert_eq!(package.updated_at, now);
    }

    #[test]
    fn test_transition_rejected_from_unexpected_status() {
        let mut finished = package(PackageStatus::Finished);
        assert!(!PackageTransition::StartAuction.apply(&mut finished, OffsetDateTime::now_utc()));
        assert!(!PackageTransition::Fail.apply(&mut finished, OffsetDateTime::now_utc()));
        assert_eq!(finished.status, PackageStatus::Finished);
    }

    #[test]
    fn test_updated_at_never_moves_backwards() {
        let mut waiting = package(PackageStatus::Waiting);
        waiting.updated_at = OffsetDateTime::UNIX_EPOCH + Duration::from_secs(100);
        assert!(PackageTransition::StartAuction.apply(&mut waiting, OffsetDateTime::UNIX_EPOCH));
        assert_eq!(
            waiting.updated_at,
            OffsetDateTime::UNIX_EPOCH + Duration::from_secs(100)
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PackageStatus::Auctioning.to_string(), "Auctioning");
        assert_eq!(PackageStatus::AuctionFailed.to_string(), "Auction-failed");
    }
}
