use {
    crate::{
        Amount,
        PackageId,
        UserId,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub type BidId = String;

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct BidCreate {
    /// The package the bid is placed on.
    #[schema(example = "pkg-7f1c2a", value_type = String)]
    pub package_id: PackageId,
    /// The user who wants to deliver the package.
    #[schema(example = "user-42", value_type = String)]
    pub user_id:    UserId,
    /// The offered price in currency minor units. Must be strictly greater than the current top bid.
    #[schema(example = 6000, value_type = i64)]
    pub amount:     Amount,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BidResultStatus {
    Success,
    Error,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct BidResult {
    pub status:  BidResultStatus,
    #[schema(example = "Bid placed")]
    pub message: String,
    /// The id assigned to the accepted bid.
    #[schema(example = "pkg-7f1c2a-user-42-1718000000000000000", value_type = Option<String>)]
    pub id:      Option<BidId>,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct Bid {
    #[schema(example = "pkg-7f1c2a-user-42-1718000000000000000", value_type = String)]
    pub id:         BidId,
    #[schema(example = "pkg-7f1c2a", value_type = String)]
    pub package_id: PackageId,
    #[schema(example = "user-42", value_type = String)]
    pub user_id:    UserId,
    #[schema(example = 6000, value_type = i64)]
    pub amount:     Amount,
    /// The time the bid was accepted.
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp:  OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct Bids {
    /// Accepted bids in acceptance order.
    pub items: Vec<Bid>,
}
