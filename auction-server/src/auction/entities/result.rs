use {
    super::{
        Bid,
        Package,
    },
    crate::kernel::entities::{
        Amount,
        Currency,
        PackageId,
        UserId,
    },
    time::OffsetDateTime,
};

#[derive(Clone, Debug, PartialEq)]
pub struct AuctionResult {
    pub package_id:  PackageId,
    pub winner_id:   UserId,
    pub final_price: Amount,
    pub currency:    Currency,
    pub finished_at: OffsetDateTime,
}

impl AuctionResult {
    pub fn new(package: &Package, winning_bid: &Bid, finished_at: OffsetDateTime) -> Self {
        Self {
            package_id: package.id.clone(),
            winner_id: winning_bid.user_id.clone(),
            final_price: winning_bid.amount,
            currency: package.currency.clone(),
            finished_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub user_id: UserId,
    pub message: String,
}

impl Notification {
    pub fn for_winner(result: &AuctionResult) -> Self {
        Self {
            user_id: result.winner_id.clone(),
            message: format!(
                "Congratulations! You won the auction for package {} at {} {}",
                result.package_id,
                format_minor_units(result.final_price),
                result.currency
            ),
        }
    }
}

fn format_minor_units(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let amount = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, amount / 100, amount % 100)
}
