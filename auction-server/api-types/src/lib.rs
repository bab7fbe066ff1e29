use {
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub mod bid;
pub mod event;
pub mod package;

pub type PackageId = String;
pub type UserId = String;
pub type Currency = String;
/// Money is carried in currency minor units (e.g. cents).
pub type Amount = i64;

#[derive(ToResponse, ToSchema, Serialize, Deserialize, Debug)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}

#[derive(AsRefStr, Clone, Copy, Debug)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "v1")]
    V1,
    #[strum(serialize = "bids")]
    Bids,
    #[strum(serialize = "packages/auctioning")]
    AuctioningPackages,
    #[strum(serialize = "packages/failed")]
    FailedPackages,
    #[strum(serialize = "packages/:package_id/bids")]
    PackageBids,
    #[strum(serialize = "packages/:package_id/bids/stream")]
    PackageBidsStream,
    #[strum(serialize = "users/:user_id/packages")]
    UserPackages,
    #[strum(serialize = "auctions/start")]
    StartAuctions,
    #[strum(serialize = "auctions/repeat")]
    RepeatAuctions,
    #[strum(serialize = "events/expired-packages")]
    ExpiredPackages,
    #[strum(serialize = "")]
    Root,
    #[strum(serialize = "live")]
    Liveness,
    #[strum(serialize = "docs")]
    Docs,
}
