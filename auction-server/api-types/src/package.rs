use {
    crate::{
        Amount,
        Currency,
        PackageId,
        UserId,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::{
        AsRefStr,
        Display,
    },
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
pub enum PackageStatus {
    /// The package is waiting for an auction to start.
    Waiting,
    /// Bids are being collected for the package.
    Auctioning,
    /// The auction ended with a winner.
    Finished,
    /// The auction ended without any bid.
    #[serde(rename = "Auction-failed")]
    #[strum(serialize = "Auction-failed")]
    AuctionFailed,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Default)]
pub struct Dimensions {
    #[schema(example = 30)]
    pub length: i32,
    #[schema(example = 20)]
    pub width:  i32,
    #[schema(example = 10)]
    pub height: i32,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct Package {
    #[schema(example = "pkg-7f1c2a", value_type = String)]
    pub package_id:     PackageId,
    pub status:         PackageStatus,
    #[schema(example = "Moscow")]
    pub from:           String,
    #[schema(example = "Kazan")]
    pub to:             String,
    #[schema(example = 2.5)]
    pub weight:         f64,
    pub dimensions:     Dimensions,
    /// The quoted delivery cost in currency minor units.
    #[schema(example = 5000, value_type = i64)]
    pub cost:           Amount,
    #[schema(example = "RUB", value_type = String)]
    pub currency:       Currency,
    #[schema(example = "standard")]
    pub tariff_code:    String,
    /// The user who won the auction. Only set once the auction is finished.
    #[schema(example = "user-42", value_type = Option<String>)]
    pub winner_user_id: Option<UserId>,
    /// The winning price in currency minor units. Only set once the auction is finished.
    #[schema(example = 7000, value_type = Option<i64>)]
    pub final_cost:     Option<Amount>,
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at:     OffsetDateTime,
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at:     OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct Packages {
    pub items: Vec<Package>,
}

/// A package whose delivery window expired and which is now ready to be auctioned.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct ExpiredPackageEvent {
    #[schema(example = "pkg-7f1c2a", value_type = String)]
    pub package_id:  PackageId,
    #[schema(example = "Waiting")]
    pub status:      String,
    #[schema(example = "Moscow")]
    pub from:        String,
    #[schema(example = "Kazan")]
    pub to:          String,
    #[schema(example = 2.5)]
    pub weight:      f64,
    #[serde(default)]
    pub dimensions:  Dimensions,
    #[schema(example = 5000, value_type = i64)]
    pub cost:        Amount,
    #[schema(example = "RUB", value_type = String)]
    pub currency:    Currency,
    #[schema(example = "standard")]
    pub tariff_code: String,
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at:  OffsetDateTime,
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at:  OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct StartAuctionsResult {
    /// Packages whose auction was started by this call.
    pub started: Vec<PackageId>,
    /// Packages that were scanned but could not be started.
    pub skipped: Vec<PackageId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PackageStatus::AuctionFailed).unwrap(),
            "\"Auction-failed\""
        );
        assert_eq!(PackageStatus::AuctionFailed.to_string(), "Auction-failed");
        assert_eq!(
            serde_json::from_str::<PackageStatus>("\"Auctioning\"").unwrap(),
            PackageStatus::Auctioning
        );
    }

    #[test]
    fn test_expired_package_event_without_dimensions() {
        let event: ExpiredPackageEvent = serde_json::from_value(serde_json::json!({
            "package_id": "pkg-1",
            "status": "Waiting",
            "from": "Moscow",
            "to": "Kazan",
            "weight": 1.5,
            "cost": 5000,
            "currency": "RUB",
            "tariff_code": "standard",
            "created_at": "2024-05-23T21:26:57Z",
            "updated_at": "2024-05-23T21:26:57Z",
        }))
        .unwrap();
        assert_eq!(event.package_id, "pkg-1");
        assert_eq!(event.dimensions, Dimensions::default());
    }
}
