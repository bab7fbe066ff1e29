pub use delivery_auction_api_types::{
    Amount,
    Currency,
    PackageId,
    UserId,
};
